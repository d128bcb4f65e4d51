//! Notifier port for valuation events.
//!
//! This module defines the trait for publishing the outcome of valuation
//! passes: one event per re-priced leader instrument after a commit, and one
//! failure event when a pass aborts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{id::InstrumentId, id::ParticipantId, valuation::LeaderQuote};
use crate::error::{Error, FailureKind};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// A leader instrument was re-priced and the write committed.
    ValuationChanged(ValuationChangedEvent),
    /// A pass aborted without writing anything.
    PassFailed(PassFailedEvent),
}

/// New price and liquidity of one leader instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuationChangedEvent {
    pub instrument_id: InstrumentId,
    pub leader_id: ParticipantId,
    pub bid_price: Decimal,
    pub ask_price: Decimal,
    pub mid_price: Decimal,
    pub tradable_volume: Decimal,
    /// Timestamp of the pass that produced this quote.
    pub valued_at: DateTime<Utc>,
}

impl ValuationChangedEvent {
    /// Create an event from a committed quote.
    #[must_use]
    pub fn from_quote(quote: &LeaderQuote, valued_at: DateTime<Utc>) -> Self {
        Self {
            instrument_id: quote.instrument_id,
            leader_id: quote.leader_id,
            bid_price: quote.bid_price,
            ask_price: quote.ask_price,
            mid_price: quote.mid_price,
            tradable_volume: quote.tradable_volume,
            valued_at,
        }
    }
}

/// Aborted pass event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassFailedEvent {
    /// Which part of the taxonomy the failure belongs to.
    pub kind: FailureKind,
    /// Human-readable reason.
    pub message: String,
    /// Participant ids involved, for diagnosis.
    pub participants: Vec<ParticipantId>,
}

impl PassFailedEvent {
    /// Create a failure event from the error that aborted the pass.
    #[must_use]
    pub fn from_error(error: &Error) -> Self {
        Self {
            kind: error.failure_kind(),
            message: error.to_string(),
            participants: error.participants(),
        }
    }
}

/// Trait for notification handlers.
///
/// Implement this trait to receive events from the system.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - The `notify` method should not block or perform slow I/O synchronously
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::{error, info};
        match event {
            Event::ValuationChanged(e) => {
                info!(
                    instrument = %e.instrument_id,
                    leader = %e.leader_id,
                    bid = %e.bid_price,
                    ask = %e.ask_price,
                    mid = %e.mid_price,
                    volume = %e.tradable_volume,
                    "Valuation changed"
                );
            }
            Event::PassFailed(e) => {
                error!(
                    kind = %e.kind,
                    participants = ?e.participants,
                    reason = %e.message,
                    "Valuation pass failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::domain::error::DomainError;
    use rust_decimal_macros::dec;

    struct CountingNotifier(Arc<AtomicUsize>);

    impl Notifier for CountingNotifier {
        fn notify(&self, _event: Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn failure() -> Event {
        let err: Error = DomainError::SelfHolding {
            participant: ParticipantId::new(1),
        }
        .into();
        Event::PassFailed(PassFailedEvent::from_error(&err))
    }

    #[test]
    fn registry_broadcasts_to_every_notifier() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(CountingNotifier(count.clone())));
        registry.register(Box::new(CountingNotifier(count.clone())));
        registry.register(Box::new(NullNotifier));

        registry.notify_all(failure());

        assert_eq!(registry.len(), 3);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_registry_is_empty() {
        let registry = NotifierRegistry::default();
        assert!(registry.is_empty());
        registry.notify_all(failure());
    }

    #[test]
    fn failure_event_carries_kind_and_participants() {
        let err: Error = DomainError::NotALeader {
            follower: ParticipantId::new(1),
            leader: ParticipantId::new(2),
        }
        .into();
        let event = PassFailedEvent::from_error(&err);

        assert_eq!(event.kind, FailureKind::DataInconsistency);
        assert_eq!(
            event.participants,
            vec![ParticipantId::new(1), ParticipantId::new(2)]
        );
        assert!(event.message.contains("without an instrument"));
    }

    #[test]
    fn valuation_event_copies_quote() {
        let quote = LeaderQuote {
            instrument_id: InstrumentId::new(7),
            leader_id: ParticipantId::new(3),
            bid_price: dec!(12000),
            ask_price: dec!(12500),
            mid_price: dec!(12250),
            tradable_volume: dec!(100000000),
        };
        let now = Utc::now();
        let event = ValuationChangedEvent::from_quote(&quote, now);

        assert_eq!(event.instrument_id, InstrumentId::new(7));
        assert_eq!(event.mid_price, dec!(12250));
        assert_eq!(event.valued_at, now);
    }

    #[test]
    fn log_notifier_handles_all_events() {
        LogNotifier.notify(failure());
    }
}
