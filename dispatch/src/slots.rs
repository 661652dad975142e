use std::sync::LazyLock;

use tally_storage::reserved_slot;
use tally_types::Slot;

/// Bookkeeping slots owned by the dispatch layer.
///
/// They are derived from namespaced labels, far away from the low indices
/// that logic layouts claim, so replacing the logic cannot clobber them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSlots {
    pub admin: Slot,
    pub implementation: Slot,
    pub initialized: Slot,
    /// JSON of the active logic's storage schema.
    pub schema: Slot,
    /// The dispatcher's own address.
    pub this: Slot,
}

static SLOTS: LazyLock<DispatchSlots> = LazyLock::new(|| DispatchSlots {
    admin: reserved_slot("tally.dispatch.admin"),
    implementation: reserved_slot("tally.dispatch.implementation"),
    initialized: reserved_slot("tally.dispatch.initialized"),
    schema: reserved_slot("tally.dispatch.schema"),
    this: reserved_slot("tally.dispatch.self"),
});

#[must_use]
pub fn dispatch_slots() -> &'static DispatchSlots {
    &SLOTS
}

impl DispatchSlots {
    #[must_use]
    pub fn all(&self) -> [Slot; 5] {
        [
            self.admin,
            self.implementation,
            self.initialized,
            self.schema,
            self.this,
        ]
    }
}
