//! The external call envelope.
//!
//! Every call is a method name plus JSON parameters. The dispatch layer only
//! looks at the method name; parameter decoding belongs to whichever logic
//! module ends up handling the call.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Address, CallError, ProposalId};

/// Data returned by a successful call.
pub type ReturnData = Value;

/// Method names of the external call surface.
pub mod method {
    pub const CREATE_PROPOSAL: &str = "createProposal";
    pub const VOTE: &str = "vote";
    pub const CLOSE_VOTE: &str = "closeVote";
    pub const GET_PROPOSALS: &str = "getProposals";
    pub const PROPOSALS: &str = "proposals";
    pub const HAS_VOTED: &str = "hasVoted";
    pub const PROPOSAL_COUNT: &str = "proposalCount";
    pub const GET_VERSION: &str = "getVersion";
    pub const PROPOSAL_STATUS: &str = "proposalStatus";

    pub const GET_IMPLEMENTATION: &str = "getImplementation";
    pub const GET_ADMIN: &str = "getAdmin";
    pub const UPGRADE_TO: &str = "upgradeTo";
    pub const INITIALIZE: &str = "initialize";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallData {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl CallData {
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// A call that takes no parameters.
    #[must_use]
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }

    /// Encode typed parameters into a call.
    pub fn with_params<P: Serialize>(method: impl Into<String>, params: &P) -> Result<Self, CallError> {
        let method = method.into();
        let params = serde_json::to_value(params).map_err(|e| CallError::MalformedCall {
            method: method.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { method, params })
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Decode the parameters. Failures surface as [`CallError::MalformedCall`].
    pub fn decode_params<P: DeserializeOwned>(&self) -> Result<P, CallError> {
        P::deserialize(&self.params).map_err(|e| CallError::MalformedCall {
            method: self.method.clone(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalParams {
    pub description: String,
    /// Signed so that non-positive requests reach the duration check
    /// instead of failing to decode.
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalParams {
    pub proposal_id: ProposalId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasVotedParams {
    pub voter: Address,
    pub proposal_id: ProposalId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeToParams {
    pub new_implementation: Address,
}
