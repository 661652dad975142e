use std::collections::BTreeMap;

use tally_types::{EmittedEvent, EventSeq, Slot};

use crate::{ChangeSet, SlotStore, StoreError};

/// Volatile backend. State lives as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<Slot, Vec<u8>>,
    events: Vec<EmittedEvent>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Snapshot of every non-empty slot, in slot order.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<Slot, Vec<u8>> {
        self.slots.clone()
    }
}

impl SlotStore for MemoryStore {
    fn load(&self, slot: &Slot) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn apply(&mut self, changes: ChangeSet) -> Result<Vec<EmittedEvent>, StoreError> {
        for (slot, value) in changes.writes {
            if value.is_empty() {
                self.slots.remove(&slot);
            } else {
                self.slots.insert(slot, value);
            }
        }

        let mut next = self
            .events
            .last()
            .map_or(EventSeq::FIRST, |last| last.seq.next());
        let mut recorded = Vec::with_capacity(changes.events.len());
        for event in changes.events {
            let emitted = EmittedEvent {
                seq: next,
                emitted_at: changes.emitted_at,
                event,
            };
            self.events.push(emitted.clone());
            recorded.push(emitted);
            next = next.next();
        }
        Ok(recorded)
    }

    fn events_since(&self, after: Option<EventSeq>) -> Result<Vec<EmittedEvent>, StoreError> {
        let start = match after {
            None => 0,
            Some(seq) => self.events.partition_point(|e| e.seq <= seq),
        };
        Ok(self.events[start..].to_vec())
    }
}
