use std::io;

use thiserror::Error;

use tally_types::{CallError, Slot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("slot {slot} holds {len} bytes, expected a {expected}")]
    CorruptValue {
        slot: Slot,
        len: usize,
        expected: &'static str,
    },

    #[error("slot {slot} holds invalid utf-8 text")]
    InvalidText { slot: Slot },

    #[error("event {seq} could not be decoded: {source}")]
    CorruptEvent {
        seq: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("event could not be encoded: {0}")]
    EventEncoding(#[source] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Storage failures inside a call revert it like any other precondition.
impl From<StoreError> for CallError {
    fn from(err: StoreError) -> Self {
        CallError::Storage {
            message: err.to_string(),
        }
    }
}
