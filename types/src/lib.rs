//! Core domain types for Tally.
//!
//! This crate contains pure domain types with no IO and minimal dependencies:
//! identities, proposals, events, the call envelope and the revert taxonomy.
//! Storage, logic and dispatch crates all speak in these types.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod address;
mod call;
mod error;
mod ids;
mod proposal;
mod slot;

pub use address::{Address, AddressParseError};
pub use call::{
    CallData, CreateProposalParams, HasVotedParams, ProposalParams, ReturnData, UpgradeToParams,
    method,
};
pub use error::{CallError, TargetRejection};
pub use ids::{EventSeq, ProposalId, SchemaVersion, Timestamp};
pub use proposal::{EmittedEvent, LedgerEvent, Proposal, ProposalStatus};
pub use slot::Slot;
