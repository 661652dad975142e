use serde::Serialize;

use tally_storage::StorageTx;
use tally_types::{Address, CallData, CallError, ReturnData, Timestamp};

use crate::StorageSchema;

/// What a logic module sees of the call it is executing.
///
/// `caller` is the original external caller and `this` is the dispatch
/// layer's address; forwarding never substitutes either. Storage is the
/// dispatch layer's, wrapped in the call's overlay.
pub struct ExecutionContext<'a, 's> {
    caller: Address,
    this: Address,
    storage: &'a mut StorageTx<'s>,
}

impl<'a, 's> ExecutionContext<'a, 's> {
    pub fn new(caller: Address, this: Address, storage: &'a mut StorageTx<'s>) -> Self {
        Self {
            caller,
            this,
            storage,
        }
    }

    #[must_use]
    pub fn caller(&self) -> Address {
        self.caller
    }

    #[must_use]
    pub fn this(&self) -> Address {
        self.this
    }

    /// Canonical time of the call, read once when the call started.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.storage.now()
    }

    #[must_use]
    pub fn storage(&self) -> &StorageTx<'s> {
        &*self.storage
    }

    pub fn storage_mut(&mut self) -> &mut StorageTx<'s> {
        &mut *self.storage
    }
}

/// Replaceable ledger code.
///
/// Implementations hold no persistent state of their own. Everything they
/// read or write goes through the context's storage, at the slots their
/// [`StorageSchema`] declares.
pub trait LedgerLogic: Send + Sync {
    fn name(&self) -> &'static str;

    /// Value reported by the `getVersion` query.
    fn version(&self) -> u64;

    fn schema(&self) -> StorageSchema;

    /// Seed default values. Run once, by the dispatch layer's initializer.
    fn initialize(&self, ctx: &mut ExecutionContext<'_, '_>) -> Result<(), CallError>;

    /// Execute a forwarded call. Unknown methods revert with
    /// [`CallError::UnknownFunction`].
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_, '_>,
        call: &CallData,
    ) -> Result<ReturnData, CallError>;
}

pub(crate) fn encode_return<T: Serialize>(value: &T) -> Result<ReturnData, CallError> {
    serde_json::to_value(value).map_err(|e| CallError::Storage {
        message: format!("return data encoding: {e}"),
    })
}
