use tally_types::{CallData, CallError, ProposalParams, ReturnData, method};

use crate::logic::encode_return;
use crate::{DurationPolicy, ExecutionContext, LedgerLogic, StorageSchema, VotingV1, machine};

/// Second voting ledger. Same storage layout as [`VotingV1`], plus the
/// `proposalStatus` query.
#[derive(Debug, Clone, Copy, Default)]
pub struct VotingV2 {
    base: VotingV1,
}

impl VotingV2 {
    pub const VERSION: u64 = 2;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(policy: DurationPolicy) -> Self {
        Self {
            base: VotingV1::with_policy(policy),
        }
    }
}

impl LedgerLogic for VotingV2 {
    fn name(&self) -> &'static str {
        "VotingV2"
    }

    fn version(&self) -> u64 {
        Self::VERSION
    }

    fn schema(&self) -> StorageSchema {
        self.base.schema()
    }

    fn initialize(&self, ctx: &mut ExecutionContext<'_, '_>) -> Result<(), CallError> {
        self.base.initialize(ctx)
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_, '_>,
        call: &CallData,
    ) -> Result<ReturnData, CallError> {
        match call.method() {
            method::GET_VERSION => encode_return(&self.version()),
            method::PROPOSAL_STATUS => {
                let params: ProposalParams = call.decode_params()?;
                let proposal = machine::existing_proposal(ctx.storage(), params.proposal_id)?;
                encode_return(&proposal.status_at(ctx.now()))
            }
            _ => self.base.execute(ctx, call),
        }
    }
}
