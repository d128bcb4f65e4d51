//! Valuation results and leader price derivation.
//!
//! Prices follow from the solved net worth of each leader:
//!
//! ```text
//! bid    = net_worth_bid / price_scale
//! ask    = max(net_worth_ask / price_scale, ask_floor)
//! mid    = (bid + ask) / 2
//! volume = if bid < ask_floor { 0 } else { full_liquidity_volume }
//! ```
//!
//! A zero tradable volume is the only liquidity gate in the system: it halts
//! trading of the instrument until its valuation recovers above the floor.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{InstrumentId, ParticipantId};
use super::money::{from_f64, Amount, Price, Volume};
use super::snapshot::HoldingsSnapshot;
use super::system::{LinearSystem, ASK_BASIS, BID_BASIS};
use crate::error::ValuationError;

/// Fixed pricing constants shared by the whole system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingParams {
    pub price_scale: Decimal,
    pub ask_floor: Price,
    pub full_liquidity_volume: Volume,
}

impl Default for PricingParams {
    fn default() -> Self {
        Self {
            price_scale: Decimal::from(100),
            ask_floor: Decimal::from(10_000),
            full_liquidity_volume: Decimal::from(100_000_000),
        }
    }
}

impl PricingParams {
    /// Derive the tradable quote of a leader instrument from the leader's
    /// solved net worth. `None` when a price leaves the decimal range.
    #[must_use]
    pub fn quote(
        &self,
        leader_id: ParticipantId,
        instrument_id: InstrumentId,
        net_worth_bid: Amount,
        net_worth_ask: Amount,
    ) -> Option<LeaderQuote> {
        let bid_price = net_worth_bid.checked_div(self.price_scale)?;
        let ask_price = net_worth_ask.checked_div(self.price_scale)?.max(self.ask_floor);
        let mid_price = bid_price.checked_add(ask_price)?.checked_div(Decimal::TWO)?;
        let tradable_volume = if bid_price < self.ask_floor {
            Decimal::ZERO
        } else {
            self.full_liquidity_volume
        };

        Some(LeaderQuote {
            instrument_id,
            leader_id,
            bid_price,
            ask_price,
            mid_price,
            tradable_volume,
        })
    }
}

/// New price and liquidity of one leader instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderQuote {
    pub instrument_id: InstrumentId,
    pub leader_id: ParticipantId,
    pub bid_price: Price,
    pub ask_price: Price,
    pub mid_price: Price,
    pub tradable_volume: Volume,
}

impl LeaderQuote {
    /// Whether the instrument may currently be traded.
    #[must_use]
    pub fn is_tradable(&self) -> bool {
        self.tradable_volume > Decimal::ZERO
    }
}

/// Solved net worth of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantValuation {
    pub participant_id: ParticipantId,
    pub net_worth_bid: Amount,
    pub net_worth_ask: Amount,
    /// Bid-basis net worth with provisions added back.
    pub gross_total_value: Amount,
}

/// Everything a pass writes, applied atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationUpdate {
    /// Per participant, ascending id.
    pub valuations: Vec<ParticipantValuation>,
    /// Per leader, ascending leader id.
    pub quotes: Vec<LeaderQuote>,
    /// Timestamp stamped on every written row.
    pub valued_at: DateTime<Utc>,
}

impl ValuationUpdate {
    /// Sort both lists into their canonical order.
    pub fn normalize(&mut self) {
        self.valuations.sort_by_key(|v| v.participant_id);
        self.quotes.sort_by_key(|q| q.leader_id);
    }

    /// Find the valuation of a participant.
    #[must_use]
    pub fn valuation(&self, participant: ParticipantId) -> Option<&ParticipantValuation> {
        self.valuations
            .iter()
            .find(|v| v.participant_id == participant)
    }

    /// Find the quote of the instrument led by `leader`.
    #[must_use]
    pub fn quote_for(&self, leader: ParticipantId) -> Option<&LeaderQuote> {
        self.quotes.iter().find(|q| q.leader_id == leader)
    }
}

/// Derived results of one solved component.
#[derive(Debug, Clone, Default)]
pub struct ComponentValuation {
    pub valuations: Vec<ParticipantValuation>,
    pub quotes: Vec<LeaderQuote>,
}

/// Turn a solved component into participant valuations and leader quotes.
///
/// `solution` holds the `[bid, ask]` solution vectors in the system's row
/// order.
///
/// # Errors
///
/// Returns [`ValuationError::NonFiniteSolution`] if a solved value, a gross
/// total or a derived price cannot be represented as a decimal amount.
pub fn derive_component(
    system: &LinearSystem,
    solution: &[Vec<f64>; 2],
    snapshot: &HoldingsSnapshot,
    pricing: &PricingParams,
) -> Result<ComponentValuation, ValuationError> {
    let mut out = ComponentValuation {
        valuations: Vec::with_capacity(system.dim()),
        quotes: Vec::new(),
    };

    for (row, &idx) in system.members().iter().enumerate() {
        let participant = snapshot.participant(idx);
        let non_finite = || ValuationError::NonFiniteSolution {
            members: system
                .members()
                .iter()
                .map(|&m| snapshot.participant(m).id)
                .collect(),
            participant: participant.id,
        };
        let net_worth_bid = from_f64(solution[BID_BASIS][row]).ok_or_else(non_finite)?;
        let net_worth_ask = from_f64(solution[ASK_BASIS][row]).ok_or_else(non_finite)?;

        let gross_total_value = net_worth_bid
            .checked_add(system.provision_out()[row])
            .ok_or_else(non_finite)?;

        out.valuations.push(ParticipantValuation {
            participant_id: participant.id,
            net_worth_bid,
            net_worth_ask,
            gross_total_value,
        });

        if let Some(instrument) = participant.instrument {
            let quote = pricing
                .quote(participant.id, instrument, net_worth_bid, net_worth_ask)
                .ok_or_else(non_finite)?;
            out.quotes.push(quote);
        }
    }

    Ok(out)
}
