use tally_types::{
    CallData, CallError, CreateProposalParams, HasVotedParams, ProposalParams, ReturnData, method,
};

use crate::logic::encode_return;
use crate::{DurationPolicy, ExecutionContext, LedgerLogic, StorageSchema, layout, machine};

/// The first voting ledger: create, vote and close, plus read queries.
///
/// Creating and closing proposals is open to every caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct VotingV1 {
    policy: DurationPolicy,
}

impl VotingV1 {
    pub const VERSION: u64 = 1;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(policy: DurationPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }
}

impl LedgerLogic for VotingV1 {
    fn name(&self) -> &'static str {
        "VotingV1"
    }

    fn version(&self) -> u64 {
        Self::VERSION
    }

    fn schema(&self) -> StorageSchema {
        layout::voting_schema()
    }

    fn initialize(&self, ctx: &mut ExecutionContext<'_, '_>) -> Result<(), CallError> {
        machine::reset(ctx);
        Ok(())
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_, '_>,
        call: &CallData,
    ) -> Result<ReturnData, CallError> {
        match call.method() {
            method::CREATE_PROPOSAL => {
                let params: CreateProposalParams = call.decode_params()?;
                let id = machine::create_proposal(
                    ctx,
                    &self.policy,
                    params.description,
                    params.duration_seconds,
                )?;
                encode_return(&id)
            }
            method::VOTE => {
                let params: ProposalParams = call.decode_params()?;
                machine::vote(ctx, params.proposal_id)?;
                Ok(ReturnData::Null)
            }
            method::CLOSE_VOTE => {
                let params: ProposalParams = call.decode_params()?;
                machine::close_vote(ctx, params.proposal_id)?;
                Ok(ReturnData::Null)
            }
            method::GET_PROPOSALS => encode_return(&machine::all_proposals(ctx.storage())?),
            method::PROPOSALS => {
                let params: ProposalParams = call.decode_params()?;
                encode_return(&machine::load_proposal(ctx.storage(), params.proposal_id)?)
            }
            method::HAS_VOTED => {
                let params: HasVotedParams = call.decode_params()?;
                encode_return(&machine::has_voted(
                    ctx.storage(),
                    params.voter,
                    params.proposal_id,
                )?)
            }
            method::PROPOSAL_COUNT => encode_return(&machine::proposal_count(ctx.storage())?),
            method::GET_VERSION => encode_return(&self.version()),
            other => Err(CallError::UnknownFunction {
                method: other.to_string(),
            }),
        }
    }
}
