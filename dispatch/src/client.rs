use serde::de::DeserializeOwned;

use tally_storage::SlotStore;
use tally_types::{
    Address, CallData, CallError, CreateProposalParams, HasVotedParams, Proposal, ProposalId,
    ProposalParams, ProposalStatus, UpgradeToParams, method,
};

use crate::Dispatcher;

/// Typed calls against a [`Dispatcher`] on behalf of one caller.
///
/// Every method encodes a [`CallData`], sends it through the dispatcher
/// exactly like an external caller would, and decodes the return data.
pub struct LedgerClient<'d, S> {
    dispatcher: &'d mut Dispatcher<S>,
    caller: Address,
}

impl<'d, S: SlotStore> LedgerClient<'d, S> {
    pub fn new(dispatcher: &'d mut Dispatcher<S>, caller: Address) -> Self {
        Self { dispatcher, caller }
    }

    #[must_use]
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Continue as a different caller.
    #[must_use]
    pub fn as_caller(self, caller: Address) -> Self {
        Self { caller, ..self }
    }

    pub fn create_proposal(
        &mut self,
        description: impl Into<String>,
        duration_seconds: i64,
    ) -> Result<ProposalId, CallError> {
        let params = CreateProposalParams {
            description: description.into(),
            duration_seconds,
        };
        self.invoke(CallData::with_params(method::CREATE_PROPOSAL, &params)?)
    }

    pub fn vote(&mut self, proposal_id: ProposalId) -> Result<(), CallError> {
        self.invoke(CallData::with_params(method::VOTE, &ProposalParams { proposal_id })?)
    }

    pub fn close_vote(&mut self, proposal_id: ProposalId) -> Result<(), CallError> {
        self.invoke(CallData::with_params(
            method::CLOSE_VOTE,
            &ProposalParams { proposal_id },
        )?)
    }

    pub fn get_proposals(&mut self) -> Result<Vec<Proposal>, CallError> {
        self.invoke(CallData::bare(method::GET_PROPOSALS))
    }

    /// The proposal with `proposal_id`, or the zero value if there is none.
    pub fn proposal(&mut self, proposal_id: ProposalId) -> Result<Proposal, CallError> {
        self.invoke(CallData::with_params(
            method::PROPOSALS,
            &ProposalParams { proposal_id },
        )?)
    }

    pub fn has_voted(&mut self, voter: Address, proposal_id: ProposalId) -> Result<bool, CallError> {
        self.invoke(CallData::with_params(
            method::HAS_VOTED,
            &HasVotedParams { voter, proposal_id },
        )?)
    }

    pub fn proposal_count(&mut self) -> Result<u64, CallError> {
        self.invoke(CallData::bare(method::PROPOSAL_COUNT))
    }

    pub fn get_version(&mut self) -> Result<u64, CallError> {
        self.invoke(CallData::bare(method::GET_VERSION))
    }

    /// Only answered by logic versions that know the query.
    pub fn proposal_status(&mut self, proposal_id: ProposalId) -> Result<ProposalStatus, CallError> {
        self.invoke(CallData::with_params(
            method::PROPOSAL_STATUS,
            &ProposalParams { proposal_id },
        )?)
    }

    pub fn get_implementation(&mut self) -> Result<Address, CallError> {
        self.invoke(CallData::bare(method::GET_IMPLEMENTATION))
    }

    pub fn get_admin(&mut self) -> Result<Address, CallError> {
        self.invoke(CallData::bare(method::GET_ADMIN))
    }

    pub fn upgrade_to(&mut self, new_implementation: Address) -> Result<(), CallError> {
        self.invoke(CallData::with_params(
            method::UPGRADE_TO,
            &UpgradeToParams { new_implementation },
        )?)
    }

    pub fn initialize(&mut self) -> Result<(), CallError> {
        self.invoke(CallData::bare(method::INITIALIZE))
    }

    fn invoke<T: DeserializeOwned>(&mut self, call: CallData) -> Result<T, CallError> {
        let output = self.dispatcher.call(self.caller, &call)?;
        serde_json::from_value(output).map_err(|e| CallError::MalformedCall {
            method: call.method,
            reason: format!("unexpected return data: {e}"),
        })
    }
}
