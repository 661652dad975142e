//! Field layout of the voting ledger.
//!
//! | slot | field           | kind                                  |
//! |------|-----------------|---------------------------------------|
//! | 0    | `proposalCount` | uint                                  |
//! | 1    | `proposals`     | mapping(id => Proposal)               |
//! | 2    | `hasVoted`      | mapping(address => mapping(id => bool)) |
//!
//! A proposal entry stores its members in five consecutive slots starting
//! at `mapping_slot(1, id)`: id, description, vote count, deadline, closed.

use tally_storage::{mapping_slot_address, mapping_slot_u64};
use tally_types::{Address, ProposalId, SchemaVersion, Slot};

use crate::{FieldKind, StorageSchema};

pub const SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1);

pub const PROPOSAL_COUNT: u64 = 0;
pub const PROPOSALS: u64 = 1;
pub const HAS_VOTED: u64 = 2;

const MEMBER_ID: u64 = 0;
const MEMBER_DESCRIPTION: u64 = 1;
const MEMBER_VOTE_COUNT: u64 = 2;
const MEMBER_DEADLINE: u64 = 3;
const MEMBER_CLOSED: u64 = 4;

/// Slots of one proposal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalSlots {
    pub id: Slot,
    pub description: Slot,
    pub vote_count: Slot,
    pub deadline: Slot,
    pub closed: Slot,
}

#[must_use]
pub fn proposal_count_slot() -> Slot {
    Slot::from_index(PROPOSAL_COUNT)
}

#[must_use]
pub fn proposal_slots(id: ProposalId) -> ProposalSlots {
    let entry = mapping_slot_u64(Slot::from_index(PROPOSALS), id.value());
    ProposalSlots {
        id: entry.offset(MEMBER_ID),
        description: entry.offset(MEMBER_DESCRIPTION),
        vote_count: entry.offset(MEMBER_VOTE_COUNT),
        deadline: entry.offset(MEMBER_DEADLINE),
        closed: entry.offset(MEMBER_CLOSED),
    }
}

#[must_use]
pub fn vote_record_slot(voter: Address, id: ProposalId) -> Slot {
    let inner = mapping_slot_address(Slot::from_index(HAS_VOTED), voter);
    mapping_slot_u64(inner, id.value())
}

/// The schema every voting logic built on this layout declares.
#[must_use]
pub fn voting_schema() -> StorageSchema {
    StorageSchema::new(SCHEMA_VERSION)
        .with_field("proposalCount", PROPOSAL_COUNT, FieldKind::Uint)
        .with_field("proposals", PROPOSALS, FieldKind::ProposalTable)
        .with_field("hasVoted", HAS_VOTED, FieldKind::VoteRecords)
}
