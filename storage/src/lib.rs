//! Slot-addressed storage for the tally ledger.
//!
//! State is a flat map from 32-byte [`Slot`](tally_types::Slot) keys to
//! byte values. Calls run against a [`StorageTx`] overlay and their
//! [`ChangeSet`] is applied to a [`SlotStore`] only when the call succeeds.

#![allow(clippy::missing_errors_doc)]

mod codec;
mod error;
pub mod layout;
mod memory;
mod secure_path;
mod sqlite;
mod store;
mod tx;

pub use codec::SlotValue;
pub use error::StoreError;
pub use layout::{mapping_slot, mapping_slot_address, mapping_slot_u64, reserved_slot};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{ChangeSet, SlotStore};
pub use tx::StorageTx;
