//! The proposal state machine.
//!
//! Mutations validate every precondition before the first write, so a
//! rejected call leaves nothing behind in the overlay even before the
//! dispatch layer discards it.

use tally_storage::StorageTx;
use tally_types::{Address, CallError, LedgerEvent, Proposal, ProposalId};

use crate::layout::{proposal_count_slot, proposal_slots, vote_record_slot};
use crate::{DurationPolicy, ExecutionContext};

pub(crate) fn proposal_count(tx: &StorageTx<'_>) -> Result<u64, CallError> {
    Ok(tx.read::<u64>(proposal_count_slot())?)
}

/// The stored proposal, or the zero value if `id` was never allocated.
pub(crate) fn load_proposal(tx: &StorageTx<'_>, id: ProposalId) -> Result<Proposal, CallError> {
    let slots = proposal_slots(id);
    let stored_id: ProposalId = tx.read(slots.id)?;
    if stored_id.is_none() {
        return Ok(Proposal::default());
    }
    Ok(Proposal {
        id: stored_id,
        description: tx.read(slots.description)?,
        vote_count: tx.read(slots.vote_count)?,
        deadline: tx.read(slots.deadline)?,
        closed: tx.read(slots.closed)?,
    })
}

pub(crate) fn existing_proposal(
    tx: &StorageTx<'_>,
    id: ProposalId,
) -> Result<Proposal, CallError> {
    let proposal = load_proposal(tx, id)?;
    if proposal.exists() {
        Ok(proposal)
    } else {
        Err(CallError::NotFound { id })
    }
}

pub(crate) fn all_proposals(tx: &StorageTx<'_>) -> Result<Vec<Proposal>, CallError> {
    let count = proposal_count(tx)?;
    (1..=count)
        .map(|id| load_proposal(tx, ProposalId::new(id)))
        .collect()
}

pub(crate) fn has_voted(
    tx: &StorageTx<'_>,
    voter: Address,
    id: ProposalId,
) -> Result<bool, CallError> {
    Ok(tx.read::<bool>(vote_record_slot(voter, id))?)
}

pub(crate) fn reset(ctx: &mut ExecutionContext<'_, '_>) {
    ctx.storage_mut().write(proposal_count_slot(), &0u64);
}

pub(crate) fn create_proposal(
    ctx: &mut ExecutionContext<'_, '_>,
    policy: &DurationPolicy,
    description: String,
    duration_seconds: i64,
) -> Result<ProposalId, CallError> {
    let secs = policy.check(duration_seconds)?;
    let deadline = ctx
        .now()
        .checked_add_secs(secs)
        .ok_or(CallError::InvalidDuration {
            seconds: duration_seconds,
        })?;

    let count = proposal_count(ctx.storage())?;
    let id = ProposalId::new(count)
        .next()
        .ok_or_else(|| CallError::Storage {
            message: "proposal counter exhausted".to_string(),
        })?;

    let slots = proposal_slots(id);
    let tx = ctx.storage_mut();
    tx.write(slots.id, &id);
    tx.write(slots.description, &description);
    tx.write(slots.vote_count, &0u64);
    tx.write(slots.deadline, &deadline);
    tx.write(slots.closed, &false);
    tx.write(proposal_count_slot(), &id.value());
    tx.emit(LedgerEvent::ProposalCreated {
        id,
        description,
        deadline,
    });

    tracing::debug!(%id, %deadline, creator = %ctx.caller(), "Proposal created");
    Ok(id)
}

pub(crate) fn vote(ctx: &mut ExecutionContext<'_, '_>, id: ProposalId) -> Result<(), CallError> {
    let voter = ctx.caller();
    let now = ctx.now();
    let proposal = existing_proposal(ctx.storage(), id)?;
    if has_voted(ctx.storage(), voter, id)? {
        return Err(CallError::AlreadyVoted { voter, id });
    }
    if proposal.closed {
        return Err(CallError::Closed { id });
    }
    if proposal.is_expired_at(now) {
        return Err(CallError::Expired {
            id,
            deadline: proposal.deadline,
        });
    }

    let vote_count = proposal
        .vote_count
        .checked_add(1)
        .ok_or_else(|| CallError::Storage {
            message: format!("vote count of proposal {id} overflowed"),
        })?;
    let tx = ctx.storage_mut();
    tx.write(vote_record_slot(voter, id), &true);
    tx.write(proposal_slots(id).vote_count, &vote_count);
    tx.emit(LedgerEvent::Voted {
        voter,
        proposal_id: id,
    });

    tracing::debug!(%id, voter = %voter.short(), vote_count, "Vote recorded");
    Ok(())
}

pub(crate) fn close_vote(
    ctx: &mut ExecutionContext<'_, '_>,
    id: ProposalId,
) -> Result<(), CallError> {
    let now = ctx.now();
    let proposal = existing_proposal(ctx.storage(), id)?;
    if proposal.closed {
        return Err(CallError::AlreadyClosed { id });
    }
    if !proposal.is_expired_at(now) {
        return Err(CallError::NotYetExpired {
            id,
            deadline: proposal.deadline,
            now,
        });
    }

    ctx.storage_mut().write(proposal_slots(id).closed, &true);
    tracing::debug!(%id, vote_count = proposal.vote_count, "Proposal closed");
    Ok(())
}
