use std::collections::BTreeMap;

use tally_types::{LedgerEvent, Slot, Timestamp};

use crate::{ChangeSet, SlotStore, SlotValue, StoreError};

/// Write overlay for a single call.
///
/// Reads see the call's own writes first, then the committed store. Nothing
/// reaches the store until [`StorageTx::into_changes`] is applied, so
/// dropping the overlay discards the call's effects.
pub struct StorageTx<'s> {
    base: &'s dyn SlotStore,
    writes: BTreeMap<Slot, Vec<u8>>,
    events: Vec<LedgerEvent>,
    now: Timestamp,
}

impl<'s> StorageTx<'s> {
    #[must_use]
    pub fn new(base: &'s dyn SlotStore, now: Timestamp) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
            events: Vec::new(),
            now,
        }
    }

    /// The time every read of the clock in this call observes.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn load(&self, slot: &Slot) -> Result<Option<Vec<u8>>, StoreError> {
        match self.writes.get(slot) {
            Some(value) if value.is_empty() => Ok(None),
            Some(value) => Ok(Some(value.clone())),
            None => self.base.load(slot),
        }
    }

    pub fn store(&mut self, slot: Slot, value: Vec<u8>) {
        self.writes.insert(slot, value);
    }

    pub fn clear(&mut self, slot: Slot) {
        self.writes.insert(slot, Vec::new());
    }

    pub fn read<T: SlotValue>(&self, slot: Slot) -> Result<T, StoreError> {
        let bytes = self.load(&slot)?;
        T::decode(slot, bytes.as_deref())
    }

    pub fn write<T: SlotValue>(&mut self, slot: Slot, value: &T) {
        self.store(slot, value.encode());
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        tracing::trace!(event = event.name(), "Buffered ledger event");
        self.events.push(event);
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.writes.is_empty() || !self.events.is_empty()
    }

    #[must_use]
    pub fn into_changes(self) -> ChangeSet {
        ChangeSet {
            writes: self.writes,
            events: self.events,
            emitted_at: self.now,
        }
    }
}
