//! Explicit, versioned storage schemas.
//!
//! Every logic module states which field lives at which slot. The dispatch
//! layer records the schema of the active logic and refuses an upgrade whose
//! schema would reinterpret an existing field. A new schema may add fields
//! but never move, retype or drop one.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tally_types::{SchemaVersion, TargetRejection};

/// What a field stores, and therefore how its slots are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// A single unsigned integer.
    Uint,
    /// `mapping(id => Proposal)`, struct members in consecutive slots from
    /// the entry slot.
    ProposalTable,
    /// `mapping(address => mapping(id => bool))`.
    VoteRecords,
}

impl FieldKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldKind::Uint => "uint",
            FieldKind::ProposalTable => "proposalTable",
            FieldKind::VoteRecords => "voteRecords",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Root slot index of the field.
    pub slot: u64,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSchema {
    pub version: SchemaVersion,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field `{name}` is declared twice")]
    DuplicateField { name: String },

    #[error("fields `{first}` and `{second}` share slot {slot}")]
    DuplicateSlot {
        slot: u64,
        first: String,
        second: String,
    },

    #[error("schema encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StorageSchema {
    #[must_use]
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, slot: u64, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            slot,
            kind,
        });
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names and root slots must both be unique.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut names = HashSet::new();
        let mut slots: HashMap<u64, &str> = HashMap::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    name: field.name.clone(),
                });
            }
            if let Some(first) = slots.insert(field.slot, field.name.as_str()) {
                return Err(SchemaError::DuplicateSlot {
                    slot: field.slot,
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check that this schema can take over storage written under
    /// `recorded`.
    pub fn check_upgrade_from(&self, recorded: &StorageSchema) -> Result<(), TargetRejection> {
        self.validate().map_err(|e| TargetRejection::IncompatibleSchema {
            field: "<schema>".to_string(),
            detail: e.to_string(),
        })?;

        if self.version < recorded.version {
            return Err(TargetRejection::IncompatibleSchema {
                field: "<schema>".to_string(),
                detail: format!(
                    "schema {} cannot replace newer schema {}",
                    self.version, recorded.version
                ),
            });
        }

        for old in &recorded.fields {
            let Some(new) = self.field(&old.name) else {
                return Err(TargetRejection::IncompatibleSchema {
                    field: old.name.clone(),
                    detail: "field removed".to_string(),
                });
            };
            if new.slot != old.slot {
                return Err(TargetRejection::IncompatibleSchema {
                    field: old.name.clone(),
                    detail: format!("moved from slot {} to slot {}", old.slot, new.slot),
                });
            }
            if new.kind != old.kind {
                return Err(TargetRejection::IncompatibleSchema {
                    field: old.name.clone(),
                    detail: format!("kind changed from {} to {}", old.kind, new.kind),
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }
}
