//! Database model types for Diesel ORM.
//!
//! Decimal columns are `TEXT` holding canonical decimal strings.

use diesel::prelude::*;

use super::schema::{external_holdings, leader_holdings, leader_instruments, participants};

/// Database row for a participant.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = participants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ParticipantRow {
    pub id: i64,
    pub cash: String,
    pub provision_balance: String,
    pub gross_total_value: Option<String>,
    pub valued_at: Option<String>,
}

/// Database row for an external asset position (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = external_holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExternalHoldingRow {
    pub id: i64,
    pub participant_id: i64,
    pub asset: String,
    pub quantity: String,
    pub bid: String,
    pub ask: String,
}

/// Database row for an external asset position (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = external_holdings)]
pub struct NewExternalHoldingRow {
    pub participant_id: i64,
    pub asset: String,
    pub quantity: String,
    pub bid: String,
    pub ask: String,
}

/// Database row for a leader instrument.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = leader_instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LeaderInstrumentRow {
    pub id: i64,
    pub leader_id: i64,
    pub bid_price: Option<String>,
    pub ask_price: Option<String>,
    pub mid_price: Option<String>,
    pub tradable_volume: Option<String>,
    pub valued_at: Option<String>,
}

/// Database row for a position in a leader instrument (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = leader_holdings)]
pub struct NewLeaderHoldingRow {
    pub follower_id: i64,
    pub instrument_id: i64,
    pub shares: String,
}

/// Price columns written for one leader instrument.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = leader_instruments)]
pub struct LeaderPriceChangeset {
    pub bid_price: Option<String>,
    pub ask_price: Option<String>,
    pub mid_price: Option<String>,
    pub tradable_volume: Option<String>,
    pub valued_at: Option<String>,
}
