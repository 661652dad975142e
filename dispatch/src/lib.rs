//! The Tally dispatch layer.
//!
//! A [`Dispatcher`] owns the ledger's storage for its whole lifetime. It
//! answers the administrative selectors itself and forwards every other
//! call to the active [`LedgerLogic`](tally_ledger::LedgerLogic), which runs
//! against the dispatcher's storage with the original caller's identity.
//! Each call is atomic: its writes and events are committed together or
//! not at all.

#![allow(clippy::missing_errors_doc)]

mod client;
mod clock;
mod dispatcher;
mod registry;
mod slots;

pub use client::LedgerClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatcher::{Dispatcher, Receipt};
pub use registry::{CodeRegistry, derive_address};
pub use slots::{DispatchSlots, dispatch_slots};
