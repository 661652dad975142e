//! Proposal records, their read-time status, and ledger events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, EventSeq, ProposalId, Timestamp};

/// A votable item.
///
/// `description` and `deadline` are fixed at creation. `vote_count` only ever
/// grows, by exactly one per accepted vote. `closed` moves from `false` to
/// `true` once and never back.
///
/// The default value (id `0`) is what a lookup of an unknown id returns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub description: String,
    pub vote_count: u64,
    pub deadline: Timestamp,
    pub closed: bool,
}

impl Proposal {
    #[must_use]
    pub fn exists(&self) -> bool {
        !self.id.is_none()
    }

    /// Voting is accepted up to and including the deadline second.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.deadline
    }

    #[must_use]
    pub fn status_at(&self, now: Timestamp) -> ProposalStatus {
        if self.closed {
            ProposalStatus::Closed
        } else if self.is_expired_at(now) {
            ProposalStatus::Expired
        } else {
            ProposalStatus::Open
        }
    }
}

/// Lifecycle classification of a proposal.
///
/// Only `Closed` is stored. `Expired` is derived at read time by comparing
/// the deadline with the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProposalStatus {
    Open,
    Expired,
    Closed,
}

impl ProposalStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Open => "open",
            ProposalStatus::Expired => "expired",
            ProposalStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events emitted by successful ledger mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    #[serde(rename_all = "camelCase")]
    ProposalCreated {
        id: ProposalId,
        description: String,
        deadline: Timestamp,
    },
    #[serde(rename_all = "camelCase")]
    Voted {
        voter: Address,
        proposal_id: ProposalId,
    },
}

impl LedgerEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            LedgerEvent::ProposalCreated { .. } => "ProposalCreated",
            LedgerEvent::Voted { .. } => "Voted",
        }
    }
}

/// An event as recorded in the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmittedEvent {
    pub seq: EventSeq,
    pub emitted_at: Timestamp,
    pub event: LedgerEvent,
}
