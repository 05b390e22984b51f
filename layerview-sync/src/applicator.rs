//! Applies decoded events to the entity store.

use crate::protocol::{EventType, WatchEvent};
use layerview_store::EntityStore;
use tracing::debug;

/// What one batch did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub replaced: usize,
    pub removed: usize,
}

impl BatchOutcome {
    /// Whether the store changed at all.
    pub fn changed(&self) -> bool {
        self.inserted + self.replaced + self.removed > 0
    }
}

/// Applies `events` in order. Removing an unknown application is a no-op.
pub fn apply_batch(store: &mut EntityStore, events: Vec<WatchEvent>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for event in events {
        match event.kind {
            EventType::Added | EventType::Modified => {
                let name = event.application.name().to_string();
                if store.upsert(event.application) {
                    outcome.replaced += 1;
                } else {
                    outcome.inserted += 1;
                }
                debug!(app = %name, kind = ?event.kind, "applied event");
            }
            EventType::Deleted => {
                let name = event.application.name();
                if store.remove(name) {
                    outcome.removed += 1;
                    debug!(app = %name, "removed application");
                } else {
                    debug!(app = %name, "delete for unknown application");
                }
            }
        }
    }
    outcome
}
