use std::collections::BTreeMap;

use tally_types::{EmittedEvent, EventSeq, LedgerEvent, Slot, Timestamp};

use crate::StoreError;

/// Everything one call changed, applied as a unit.
///
/// A write of an empty value clears the slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub writes: BTreeMap<Slot, Vec<u8>>,
    pub events: Vec<LedgerEvent>,
    pub emitted_at: Timestamp,
}

impl ChangeSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.events.is_empty()
    }
}

/// Persistent slot storage plus the append-only event log.
///
/// Backends must apply a [`ChangeSet`] atomically: after `apply` returns
/// either every write and event is visible or none is.
pub trait SlotStore {
    /// Raw bytes at `slot`, or `None` if the slot was never written or was
    /// cleared.
    fn load(&self, slot: &Slot) -> Result<Option<Vec<u8>>, StoreError>;

    /// Apply a change set, assigning consecutive sequence numbers to its
    /// events. Returns the events as recorded.
    fn apply(&mut self, changes: ChangeSet) -> Result<Vec<EmittedEvent>, StoreError>;

    /// Events with a sequence number greater than `after`, oldest first.
    /// `None` returns the whole log.
    fn events_since(&self, after: Option<EventSeq>) -> Result<Vec<EmittedEvent>, StoreError>;
}

impl<S: SlotStore + ?Sized> SlotStore for Box<S> {
    fn load(&self, slot: &Slot) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).load(slot)
    }

    fn apply(&mut self, changes: ChangeSet) -> Result<Vec<EmittedEvent>, StoreError> {
        (**self).apply(changes)
    }

    fn events_since(&self, after: Option<EventSeq>) -> Result<Vec<EmittedEvent>, StoreError> {
        (**self).events_since(after)
    }
}
