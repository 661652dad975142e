//! Ledger logic for Tally.
//!
//! A logic module is stateless code. It declares a [`StorageSchema`] and
//! implements [`LedgerLogic::execute`] against whatever storage the dispatch
//! layer hands it through an [`ExecutionContext`]. Replacing the logic never
//! moves data; it only changes the rules applied to it.

#![allow(clippy::missing_errors_doc)]

pub mod layout;
mod logic;
mod machine;
mod policy;
mod schema;
mod v1;
mod v2;

pub use logic::{ExecutionContext, LedgerLogic};
pub use policy::DurationPolicy;
pub use schema::{FieldKind, FieldSpec, SchemaError, StorageSchema};
pub use v1::VotingV1;
pub use v2::VotingV2;
