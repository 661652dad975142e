//! The revert taxonomy.
//!
//! Every variant is fatal to the call that raised it: the call's storage
//! writes and events are discarded and the error is handed back to the
//! caller unchanged. Nothing is retried internally.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Address, ProposalId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum CallError {
    #[error("unauthorized: {caller} is not the administrator")]
    Unauthorized { caller: Address },

    #[error("invalid upgrade target {target}: {reason}")]
    InvalidTarget {
        target: Address,
        reason: TargetRejection,
    },

    #[error("already initialized")]
    AlreadyInitialized,

    #[error("dispatch storage has not been initialized")]
    NotInitialized,

    #[error("invalid duration: {seconds} seconds")]
    InvalidDuration { seconds: i64 },

    #[error("proposal {id} not found")]
    NotFound { id: ProposalId },

    #[error("{voter} already voted on proposal {id}")]
    AlreadyVoted { voter: Address, id: ProposalId },

    #[error("proposal {id} expired at {deadline}")]
    Expired { id: ProposalId, deadline: Timestamp },

    #[error("proposal {id} is closed")]
    Closed { id: ProposalId },

    #[error("proposal {id} is already closed")]
    AlreadyClosed { id: ProposalId },

    #[error("proposal {id} is still open until {deadline} (now {now})")]
    NotYetExpired {
        id: ProposalId,
        deadline: Timestamp,
        now: Timestamp,
    },

    #[error("unknown function `{method}`")]
    UnknownFunction { method: String },

    #[error("malformed call to `{method}`: {reason}")]
    MalformedCall { method: String, reason: String },

    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl CallError {
    /// Stable identifier of the revert reason.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            CallError::Unauthorized { .. } => "Unauthorized",
            CallError::InvalidTarget { .. } => "InvalidTarget",
            CallError::AlreadyInitialized => "AlreadyInitialized",
            CallError::NotInitialized => "NotInitialized",
            CallError::InvalidDuration { .. } => "InvalidDuration",
            CallError::NotFound { .. } => "NotFound",
            CallError::AlreadyVoted { .. } => "AlreadyVoted",
            CallError::Expired { .. } => "Expired",
            CallError::Closed { .. } => "Closed",
            CallError::AlreadyClosed { .. } => "AlreadyClosed",
            CallError::NotYetExpired { .. } => "NotYetExpired",
            CallError::UnknownFunction { .. } => "UnknownFunction",
            CallError::MalformedCall { .. } => "MalformedCall",
            CallError::Storage { .. } => "Storage",
        }
    }
}

/// Why an upgrade target was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetRejection {
    #[error("null address")]
    ZeroAddress,
    #[error("no executable code at address")]
    NoCode,
    #[error("storage schema mismatch at field `{field}`: {detail}")]
    IncompatibleSchema { field: String, detail: String },
}
