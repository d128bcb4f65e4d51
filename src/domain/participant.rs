//! Participants and their finance snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{InstrumentId, ParticipantId};
use super::money::Amount;

/// A participant's finances as read at the start of a pass.
///
/// Exists for every user who either holds any position or is a leader.
/// External values cover only non-leader holdings; positions in leader
/// instruments are carried by ownership edges instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Uninvested funds.
    pub cash: Amount,
    /// Net provisions paid or received to date.
    pub provision_balance: Amount,
    /// Liquidation value of non-leader holdings.
    pub external_value_bid: Amount,
    /// Replacement value of non-leader holdings.
    pub external_value_ask: Amount,
    /// The leader instrument this participant owns, if it is a leader.
    pub instrument: Option<InstrumentId>,
}

impl Participant {
    /// Create a participant that owns no instrument, with zero balances.
    #[must_use]
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            cash: Decimal::ZERO,
            provision_balance: Decimal::ZERO,
            external_value_bid: Decimal::ZERO,
            external_value_ask: Decimal::ZERO,
            instrument: None,
        }
    }

    /// Set uninvested cash.
    #[must_use]
    pub fn with_cash(mut self, cash: Amount) -> Self {
        self.cash = cash;
        self
    }

    /// Set the provision balance.
    #[must_use]
    pub fn with_provision(mut self, provision_balance: Amount) -> Self {
        self.provision_balance = provision_balance;
        self
    }

    /// Set the bid/ask value of external holdings.
    #[must_use]
    pub fn with_external(mut self, bid: Amount, ask: Amount) -> Self {
        self.external_value_bid = bid;
        self.external_value_ask = ask;
        self
    }

    /// Mark this participant as the leader of `instrument`.
    #[must_use]
    pub fn leading(mut self, instrument: InstrumentId) -> Self {
        self.instrument = Some(instrument);
        self
    }

    /// Whether this participant owns a leader instrument.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.instrument.is_some()
    }

    /// Own value on the bid basis, before any leader holdings. `None` when
    /// the sum leaves the decimal range.
    #[must_use]
    pub fn base_value_bid(&self) -> Option<Amount> {
        base_value(self.external_value_bid, self.cash, self.provision_balance)
    }

    /// Own value on the ask basis, before any leader holdings.
    #[must_use]
    pub fn base_value_ask(&self) -> Option<Amount> {
        base_value(self.external_value_ask, self.cash, self.provision_balance)
    }
}

fn base_value(external: Amount, cash: Amount, provision_balance: Amount) -> Option<Amount> {
    external.checked_add(cash)?.checked_sub(provision_balance)
}
