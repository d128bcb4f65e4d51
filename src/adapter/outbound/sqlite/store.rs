//! SQLite valuation store implementation.
//!
//! Each pass runs inside one `BEGIN IMMEDIATE` transaction. SQLite takes the
//! database write lock when the transaction opens, so a concurrent pass (or
//! any other writer) waits until this one commits or rolls back, and no
//! reader observes a half-written result.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::adapter::outbound::sqlite::database::connection::{
    configure_sqlite_connection, DbPool,
};
use crate::adapter::outbound::sqlite::database::model::{
    ExternalHoldingRow, LeaderInstrumentRow, LeaderPriceChangeset, NewExternalHoldingRow,
    NewLeaderHoldingRow, ParticipantRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    external_holdings, leader_holdings, leader_instruments, participants,
};
use crate::domain::{
    edge::OwnershipEdge,
    id::{InstrumentId, ParticipantId},
    participant::Participant,
    valuation::{LeaderQuote, ValuationUpdate},
};
use crate::error::{Error, Result};
use crate::port::outbound::store::{LockMode, PassScope, StorageRegion, ValuationStore};

/// SQLite-backed valuation store.
pub struct SqliteValuationStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteValuationStore {
    /// Create a new SQLite valuation store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        configure_sqlite_connection(&mut conn)?;
        Ok(conn)
    }

    /// Insert a participant with its cash and provision balance.
    ///
    /// # Errors
    /// Returns an error if the row cannot be written.
    pub fn insert_participant(
        &self,
        id: ParticipantId,
        cash: Decimal,
        provision_balance: Decimal,
    ) -> Result<()> {
        let row = ParticipantRow {
            id: id.get(),
            cash: decimal_to_text(cash),
            provision_balance: decimal_to_text(provision_balance),
            gross_total_value: None,
            valued_at: None,
        };
        diesel::insert_into(participants::table)
            .values(&row)
            .execute(&mut self.connection()?)?;
        Ok(())
    }

    /// Register `leader` as the issuer of `instrument`. The instrument starts
    /// unpriced.
    ///
    /// # Errors
    /// Returns an error if the row cannot be written.
    pub fn insert_leader_instrument(
        &self,
        instrument: InstrumentId,
        leader: ParticipantId,
    ) -> Result<()> {
        let row = LeaderInstrumentRow {
            id: instrument.get(),
            leader_id: leader.get(),
            bid_price: None,
            ask_price: None,
            mid_price: None,
            tradable_volume: None,
            valued_at: None,
        };
        diesel::insert_into(leader_instruments::table)
            .values(&row)
            .execute(&mut self.connection()?)?;
        Ok(())
    }

    /// Record a position in an external asset.
    ///
    /// # Errors
    /// Returns an error if the row cannot be written.
    pub fn insert_external_holding(
        &self,
        participant: ParticipantId,
        asset: &str,
        quantity: Decimal,
        bid: Decimal,
        ask: Decimal,
    ) -> Result<()> {
        let row = NewExternalHoldingRow {
            participant_id: participant.get(),
            asset: asset.to_string(),
            quantity: decimal_to_text(quantity),
            bid: decimal_to_text(bid),
            ask: decimal_to_text(ask),
        };
        diesel::insert_into(external_holdings::table)
            .values(&row)
            .execute(&mut self.connection()?)?;
        Ok(())
    }

    /// Record `follower` holding `shares` of `instrument`.
    ///
    /// # Errors
    /// Returns an error if the row cannot be written.
    pub fn insert_leader_holding(
        &self,
        follower: ParticipantId,
        instrument: InstrumentId,
        shares: Decimal,
    ) -> Result<()> {
        let row = NewLeaderHoldingRow {
            follower_id: follower.get(),
            instrument_id: instrument.get(),
            shares: decimal_to_text(shares),
        };
        diesel::insert_into(leader_holdings::table)
            .values(&row)
            .execute(&mut self.connection()?)?;
        Ok(())
    }

    /// Committed quote of an instrument, `None` while it has never been
    /// priced.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read or holds malformed values.
    pub fn quote(&self, instrument: InstrumentId) -> Result<Option<LeaderQuote>> {
        let row: Option<LeaderInstrumentRow> = leader_instruments::table
            .find(instrument.get())
            .select(LeaderInstrumentRow::as_select())
            .first(&mut self.connection()?)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        let (Some(bid), Some(ask), Some(mid), Some(volume)) = (
            row.bid_price.as_deref(),
            row.ask_price.as_deref(),
            row.mid_price.as_deref(),
            row.tradable_volume.as_deref(),
        ) else {
            return Ok(None);
        };

        Ok(Some(LeaderQuote {
            instrument_id: InstrumentId::new(row.id),
            leader_id: ParticipantId::new(row.leader_id),
            bid_price: text_to_decimal("bid_price", bid)?,
            ask_price: text_to_decimal("ask_price", ask)?,
            mid_price: text_to_decimal("mid_price", mid)?,
            tradable_volume: text_to_decimal("tradable_volume", volume)?,
        }))
    }

    /// Committed gross total value and pass timestamp of a participant.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read or holds malformed values.
    pub fn gross_total_value(
        &self,
        participant: ParticipantId,
    ) -> Result<Option<(Decimal, DateTime<Utc>)>> {
        let row: Option<ParticipantRow> = participants::table
            .find(participant.get())
            .select(ParticipantRow::as_select())
            .first(&mut self.connection()?)
            .optional()?;

        match row {
            Some(ParticipantRow {
                gross_total_value: Some(value),
                valued_at: Some(stamp),
                ..
            }) => Ok(Some((
                text_to_decimal("gross_total_value", &value)?,
                text_to_timestamp(&stamp)?,
            ))),
            _ => Ok(None),
        }
    }
}

fn decimal_to_text(value: Decimal) -> String {
    value.normalize().to_string()
}

fn text_to_decimal(field: &str, text: &str) -> Result<Decimal> {
    Decimal::from_str(text).map_err(|e| Error::Parse(format!("{field} = {text:?}: {e}")))
}

/// `total + quantity * price`, or a parse error when the external value of
/// `participant` leaves the decimal range.
fn accumulate(
    participant: i64,
    total: Decimal,
    quantity: Decimal,
    price: Decimal,
) -> Result<Decimal> {
    quantity
        .checked_mul(price)
        .and_then(|value| total.checked_add(value))
        .ok_or_else(|| {
            Error::Parse(format!("external value of participant {participant} overflows"))
        })
}

fn text_to_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(e.to_string()))
}

struct SqlitePass<'a> {
    conn: &'a mut SqliteConnection,
    locks: Vec<(StorageRegion, LockMode)>,
}

impl SqlitePass<'_> {
    fn ensure_locked(&self) -> Result<()> {
        if self.locks.is_empty() {
            return Err(Error::Database(
                "pass accessed storage before locking".to_string(),
            ));
        }
        Ok(())
    }
}

impl PassScope for SqlitePass<'_> {
    fn lock(&mut self, regions: &[(StorageRegion, LockMode)]) -> Result<()> {
        // BEGIN IMMEDIATE already holds the database write lock, which
        // covers every region in either mode.
        trace!(?regions, "Regions covered by immediate transaction");
        self.locks.extend_from_slice(regions);
        Ok(())
    }

    fn load_participants(&mut self) -> Result<Vec<Participant>> {
        self.ensure_locked()?;

        let rows: Vec<ParticipantRow> = participants::table
            .order(participants::id.asc())
            .select(ParticipantRow::as_select())
            .load(&mut *self.conn)?;
        let holdings: Vec<ExternalHoldingRow> = external_holdings::table
            .order(external_holdings::id.asc())
            .select(ExternalHoldingRow::as_select())
            .load(&mut *self.conn)?;
        let instruments: Vec<(i64, i64)> = leader_instruments::table
            .select((leader_instruments::leader_id, leader_instruments::id))
            .load(&mut *self.conn)?;
        let positions: Vec<(i64, String)> = leader_holdings::table
            .select((leader_holdings::follower_id, leader_holdings::shares))
            .load(&mut *self.conn)?;

        let mut external: BTreeMap<i64, (Decimal, Decimal)> = BTreeMap::new();
        for holding in holdings {
            let quantity = text_to_decimal("quantity", &holding.quantity)?;
            let bid = text_to_decimal("bid", &holding.bid)?;
            let ask = text_to_decimal("ask", &holding.ask)?;
            let entry = external
                .entry(holding.participant_id)
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 = accumulate(holding.participant_id, entry.0, quantity, bid)?;
            entry.1 = accumulate(holding.participant_id, entry.1, quantity, ask)?;
        }
        let instruments: BTreeMap<i64, i64> = instruments.into_iter().collect();
        let mut followers = BTreeSet::new();
        for (follower, shares) in positions {
            if !text_to_decimal("shares", &shares)?.is_zero() {
                followers.insert(follower);
            }
        }

        // Only participants that hold something or lead an instrument.
        let participants = rows
            .into_iter()
            .filter(|row| {
                external.contains_key(&row.id)
                    || instruments.contains_key(&row.id)
                    || followers.contains(&row.id)
            })
            .map(|row| -> Result<Participant> {
                let (external_bid, external_ask) = external
                    .get(&row.id)
                    .copied()
                    .unwrap_or((Decimal::ZERO, Decimal::ZERO));
                let mut participant = Participant::new(ParticipantId::new(row.id))
                    .with_cash(text_to_decimal("cash", &row.cash)?)
                    .with_provision(text_to_decimal("provision_balance", &row.provision_balance)?)
                    .with_external(external_bid, external_ask);
                if let Some(&instrument) = instruments.get(&row.id) {
                    participant = participant.leading(InstrumentId::new(instrument));
                }
                Ok(participant)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(participants = participants.len(), "Loaded participants");
        Ok(participants)
    }

    fn load_edges(&mut self) -> Result<Vec<OwnershipEdge>> {
        self.ensure_locked()?;

        let rows: Vec<(i64, i64, String)> = leader_holdings::table
            .inner_join(leader_instruments::table)
            .select((
                leader_holdings::follower_id,
                leader_instruments::leader_id,
                leader_holdings::shares,
            ))
            .order((
                leader_holdings::follower_id.asc(),
                leader_instruments::leader_id.asc(),
                leader_holdings::id.asc(),
            ))
            .load(&mut *self.conn)?;

        let mut edges = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for (follower, leader, shares) in rows {
            let shares = text_to_decimal("shares", &shares)?;
            // Own-instrument positions and closed positions are not edges.
            if follower == leader || shares.is_zero() {
                skipped += 1;
                continue;
            }
            edges.push(OwnershipEdge::try_new(
                ParticipantId::new(follower),
                ParticipantId::new(leader),
                shares,
            )?);
        }

        debug!(edges = edges.len(), skipped, "Loaded ownership edges");
        Ok(edges)
    }

    fn apply(&mut self, update: &ValuationUpdate) -> Result<()> {
        self.ensure_locked()?;
        let stamp = update.valued_at.to_rfc3339();

        for valuation in &update.valuations {
            let written = diesel::update(participants::table.find(valuation.participant_id.get()))
                .set((
                    participants::gross_total_value
                        .eq(Some(decimal_to_text(valuation.gross_total_value))),
                    participants::valued_at.eq(Some(stamp.clone())),
                ))
                .execute(&mut *self.conn)?;
            if written != 1 {
                return Err(Error::Database(format!(
                    "participant {} not found while writing valuation",
                    valuation.participant_id
                )));
            }
        }

        for quote in &update.quotes {
            let changes = LeaderPriceChangeset {
                bid_price: Some(decimal_to_text(quote.bid_price)),
                ask_price: Some(decimal_to_text(quote.ask_price)),
                mid_price: Some(decimal_to_text(quote.mid_price)),
                tradable_volume: Some(decimal_to_text(quote.tradable_volume)),
                valued_at: Some(stamp.clone()),
            };
            let written = diesel::update(leader_instruments::table.find(quote.instrument_id.get()))
                .set(&changes)
                .execute(&mut *self.conn)?;
            if written != 1 {
                return Err(Error::Database(format!(
                    "leader instrument {} not found while writing quote",
                    quote.instrument_id
                )));
            }
        }

        debug!(
            valuations = update.valuations.len(),
            quotes = update.quotes.len(),
            "Staged valuation update"
        );
        Ok(())
    }
}

impl ValuationStore for SqliteValuationStore {
    fn with_pass<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&mut dyn PassScope) -> Result<T>,
    {
        let mut conn = self.connection()?;
        conn.immediate_transaction(|conn| {
            let mut pass = SqlitePass {
                conn,
                locks: Vec::new(),
            };
            body(&mut pass)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use crate::domain::valuation::{ParticipantValuation, PricingParams};
    use crate::domain::DomainError;
    use crate::port::outbound::store::PASS_LOCKS;
    use rust_decimal_macros::dec;

    fn store() -> (tempfile::TempDir, SqliteValuationStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("store.db").to_string_lossy().into_owned();
        let pool = create_pool(&url).unwrap();
        run_migrations(&pool).unwrap();
        (dir, SqliteValuationStore::new(pool))
    }

    fn id(raw: i64) -> ParticipantId {
        ParticipantId::new(raw)
    }

    #[test]
    fn decimal_text_is_canonical() {
        assert_eq!(decimal_to_text(dec!(10.500)), "10.5");
        assert_eq!(decimal_to_text(dec!(100000000)), "100000000");
        assert_eq!(text_to_decimal("x", "10.5").unwrap(), dec!(10.5));
        assert!(matches!(text_to_decimal("x", "ten"), Err(Error::Parse(_))));
    }

    #[test]
    fn loads_aggregated_external_values() {
        let (_dir, store) = store();
        store.insert_participant(id(1), dec!(100), dec!(25)).unwrap();
        store
            .insert_external_holding(id(1), "GOLD", dec!(2), dec!(10), dec!(11))
            .unwrap();
        store
            .insert_external_holding(id(1), "OIL", dec!(3), dec!(5), dec!(6))
            .unwrap();

        let participants = store
            .with_pass(|scope| {
                scope.lock(&PASS_LOCKS)?;
                scope.load_participants()
            })
            .unwrap();

        assert_eq!(participants.len(), 1);
        let p = &participants[0];
        assert_eq!(p.external_value_bid, dec!(35));
        assert_eq!(p.external_value_ask, dec!(40));
        assert_eq!(p.cash, dec!(100));
        assert_eq!(p.provision_balance, dec!(25));
        assert!(!p.is_leader());
    }

    #[test]
    fn loads_edges_resolved_to_leaders() {
        let (_dir, store) = store();
        for raw in 1..=3 {
            store.insert_participant(id(raw), dec!(0), dec!(0)).unwrap();
        }
        store.insert_leader_instrument(InstrumentId::new(20), id(2)).unwrap();
        store.insert_leader_instrument(InstrumentId::new(30), id(3)).unwrap();
        store.insert_leader_holding(id(1), InstrumentId::new(20), dec!(5)).unwrap();
        store.insert_leader_holding(id(3), InstrumentId::new(20), dec!(7)).unwrap();
        // Self-holding and empty position are ignored.
        store.insert_leader_holding(id(3), InstrumentId::new(30), dec!(4)).unwrap();
        store.insert_leader_holding(id(1), InstrumentId::new(30), dec!(0)).unwrap();

        let (participants, edges) = store
            .with_pass(|scope| {
                scope.lock(&PASS_LOCKS)?;
                Ok((scope.load_participants()?, scope.load_edges()?))
            })
            .unwrap();

        assert_eq!(participants[1].instrument, Some(InstrumentId::new(20)));
        assert_eq!(participants[2].instrument, Some(InstrumentId::new(30)));
        let pairs: Vec<(i64, i64, Decimal)> = edges
            .iter()
            .map(|e| (e.follower().get(), e.leader().get(), e.shares()))
            .collect();
        assert_eq!(pairs, vec![(1, 2, dec!(5)), (3, 2, dec!(7))]);
    }

    #[test]
    fn external_value_overflow_is_parse_error() {
        let (_dir, store) = store();
        store.insert_participant(id(1), dec!(0), dec!(0)).unwrap();
        store
            .insert_external_holding(
                id(1),
                "GOLD",
                dec!(100000000000000000000),
                dec!(100000000000000000000),
                dec!(1),
            )
            .unwrap();

        let result = store.with_pass(|scope| {
            scope.lock(&PASS_LOCKS)?;
            scope.load_participants()
        });

        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn participants_without_positions_are_not_loaded() {
        let (_dir, store) = store();
        for raw in 1..=5 {
            store.insert_participant(id(raw), dec!(10), dec!(0)).unwrap();
        }
        store.insert_leader_instrument(InstrumentId::new(2), id(2)).unwrap();
        store
            .insert_external_holding(id(3), "OIL", dec!(1), dec!(5), dec!(6))
            .unwrap();
        store.insert_leader_holding(id(4), InstrumentId::new(2), dec!(3)).unwrap();
        // A closed position does not count.
        store.insert_leader_holding(id(5), InstrumentId::new(2), dec!(0)).unwrap();

        let participants = store
            .with_pass(|scope| {
                scope.lock(&PASS_LOCKS)?;
                scope.load_participants()
            })
            .unwrap();

        let ids: Vec<i64> = participants.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn negative_shares_fail_the_load() {
        let (_dir, store) = store();
        store.insert_participant(id(1), dec!(0), dec!(0)).unwrap();
        store.insert_participant(id(2), dec!(0), dec!(0)).unwrap();
        store.insert_leader_instrument(InstrumentId::new(20), id(2)).unwrap();
        store.insert_leader_holding(id(1), InstrumentId::new(20), dec!(-3)).unwrap();

        let result = store.with_pass(|scope| {
            scope.lock(&PASS_LOCKS)?;
            scope.load_edges()
        });

        assert!(matches!(
            result,
            Err(Error::Domain(DomainError::NonPositiveShares { .. }))
        ));
    }

    #[test]
    fn apply_commits_prices_and_gross_totals() {
        let (_dir, store) = store();
        store.insert_participant(id(1), dec!(0), dec!(0)).unwrap();
        store.insert_leader_instrument(InstrumentId::new(9), id(1)).unwrap();
        let valued_at = Utc::now();
        let update = ValuationUpdate {
            valuations: vec![ParticipantValuation {
                participant_id: id(1),
                net_worth_bid: dec!(2000000),
                net_worth_ask: dec!(2000000),
                gross_total_value: dec!(2000050),
            }],
            quotes: vec![PricingParams::default()
                .quote(id(1), InstrumentId::new(9), dec!(2000000), dec!(2000000))
                .unwrap()],
            valued_at,
        };

        store
            .with_pass(|scope| {
                scope.lock(&PASS_LOCKS)?;
                scope.apply(&update)
            })
            .unwrap();

        let quote = store.quote(InstrumentId::new(9)).unwrap().unwrap();
        assert_eq!(quote, update.quotes[0]);
        let (gross, stamp) = store.gross_total_value(id(1)).unwrap().unwrap();
        assert_eq!(gross, dec!(2000050));
        assert_eq!(stamp.timestamp_micros(), valued_at.timestamp_micros());
    }

    #[test]
    fn failing_body_rolls_back_applied_rows() {
        let (_dir, store) = store();
        store.insert_participant(id(1), dec!(0), dec!(0)).unwrap();
        store.insert_leader_instrument(InstrumentId::new(9), id(1)).unwrap();
        let update = ValuationUpdate {
            valuations: vec![],
            quotes: vec![PricingParams::default()
                .quote(id(1), InstrumentId::new(9), dec!(3000000), dec!(3000000))
                .unwrap()],
            valued_at: Utc::now(),
        };

        let result: Result<()> = store.with_pass(|scope| {
            scope.lock(&PASS_LOCKS)?;
            scope.apply(&update)?;
            Err(Error::Runtime("abort after write".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(store.quote(InstrumentId::new(9)).unwrap(), None);
    }

    #[test]
    fn apply_to_missing_instrument_fails() {
        let (_dir, store) = store();
        let update = ValuationUpdate {
            valuations: vec![],
            quotes: vec![PricingParams::default()
                .quote(id(1), InstrumentId::new(404), dec!(1), dec!(1))
                .unwrap()],
            valued_at: Utc::now(),
        };

        let result = store.with_pass(|scope| {
            scope.lock(&PASS_LOCKS)?;
            scope.apply(&update)
        });

        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[test]
    fn reading_before_lock_is_rejected() {
        let (_dir, store) = store();
        let result = store.with_pass(|scope| scope.load_participants());
        assert!(matches!(result, Err(Error::Database(_))));
    }
}
