//! Recording notifier for asserting on emitted events.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::ParticipantId;
use crate::port::outbound::notifier::{Event, Notifier, PassFailedEvent, ValuationChangedEvent};

/// Notifier that keeps every event it receives. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// `ValuationChanged` events, in emission order.
    pub fn changed(&self) -> Vec<ValuationChangedEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::ValuationChanged(changed) => Some(changed.clone()),
                Event::PassFailed(_) => None,
            })
            .collect()
    }

    /// `PassFailed` events, in emission order.
    pub fn failures(&self) -> Vec<PassFailedEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::PassFailed(failed) => Some(failed.clone()),
                Event::ValuationChanged(_) => None,
            })
            .collect()
    }

    /// Leader ids of `ValuationChanged` events, in emission order.
    pub fn changed_leaders(&self) -> Vec<ParticipantId> {
        self.changed().iter().map(|c| c.leader_id).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}
