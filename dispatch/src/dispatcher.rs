use std::sync::Arc;

use tally_ledger::{ExecutionContext, LedgerLogic, StorageSchema};
use tally_storage::{SlotStore, SlotValue, StorageTx};
use tally_types::{
    Address, CallData, CallError, EmittedEvent, EventSeq, ReturnData, Slot, TargetRejection,
    UpgradeToParams, method,
};

use crate::{Clock, CodeRegistry, LedgerClient, derive_address, dispatch_slots};

/// Output of a successful call together with the events it recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub output: ReturnData,
    pub events: Vec<EmittedEvent>,
}

/// The permanent entry point of a ledger deployment.
pub struct Dispatcher<S> {
    store: S,
    registry: Arc<CodeRegistry>,
    clock: Arc<dyn Clock>,
    address: Address,
}

impl<S: SlotStore> Dispatcher<S> {
    /// Construct a dispatch layer over `store` pointing at `implementation`
    /// and run the initializer with `deployer` as caller, in one atomic
    /// unit. Nothing is persisted if any step fails, and the registry nonce
    /// is only consumed once the deployment has committed.
    pub fn deploy(
        store: S,
        registry: Arc<CodeRegistry>,
        clock: Arc<dyn Clock>,
        deployer: Address,
        implementation: Address,
    ) -> Result<Self, CallError> {
        let nonce = registry.pending_nonce();
        let address = derive_address(deployer, nonce);
        let mut dispatcher = Self {
            store,
            registry,
            clock,
            address,
        };

        let ((), events) = dispatcher.transact(|this, tx| {
            let slots = dispatch_slots();
            if tx.read::<bool>(slots.initialized)? {
                return Err(CallError::AlreadyInitialized);
            }
            this.resolve_target(implementation)?;
            tx.write(slots.this, &this.address);
            tx.write(slots.implementation, &implementation);
            this.initialize(tx, deployer)
        })?;
        debug_assert!(events.is_empty());
        if !dispatcher.registry.claim_nonce(nonce) {
            tracing::warn!(%address, nonce, "Registry nonce was taken by a concurrent deployment");
        }

        tracing::info!(
            address = %dispatcher.address,
            %implementation,
            admin = %deployer,
            "Deployed dispatch layer"
        );
        Ok(dispatcher)
    }

    /// Reattach to a store that already holds an initialized deployment.
    pub fn open(
        store: S,
        registry: Arc<CodeRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CallError> {
        let slots = dispatch_slots();
        let (initialized, address, implementation) = {
            let tx = StorageTx::new(&store, clock.now());
            (
                tx.read::<bool>(slots.initialized)?,
                tx.read::<Address>(slots.this)?,
                tx.read::<Address>(slots.implementation)?,
            )
        };
        if !initialized {
            return Err(CallError::NotInitialized);
        }
        if !registry.has_code(implementation) {
            tracing::warn!(%implementation, "Active implementation is not in the code registry");
        }

        tracing::info!(%address, %implementation, "Opened dispatch layer");
        Ok(Self {
            store,
            registry,
            clock,
            address,
        })
    }

    /// Address the logic sees as "self".
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn implementation(&self) -> Result<Address, CallError> {
        self.read_slot(dispatch_slots().implementation)
    }

    pub fn admin(&self) -> Result<Address, CallError> {
        self.read_slot(dispatch_slots().admin)
    }

    /// Schema recorded for the active logic.
    pub fn schema(&self) -> Result<Option<StorageSchema>, CallError> {
        let json: String = self.read_slot(dispatch_slots().schema)?;
        parse_schema(&json)
    }

    /// Recorded events with a sequence number after `after`, oldest first.
    pub fn events_since(&self, after: Option<EventSeq>) -> Result<Vec<EmittedEvent>, CallError> {
        Ok(self.store.events_since(after)?)
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<CodeRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Typed access to the call surface on behalf of `caller`.
    pub fn client(&mut self, caller: Address) -> LedgerClient<'_, S> {
        LedgerClient::new(self, caller)
    }

    /// Execute one call from `caller`. Success commits the call's writes
    /// and events; failure discards them and returns the revert verbatim.
    pub fn execute(&mut self, caller: Address, call: &CallData) -> Result<Receipt, CallError> {
        match self.transact(|this, tx| this.route(tx, caller, call)) {
            Ok((output, events)) => {
                tracing::debug!(
                    method = call.method(),
                    caller = %caller.short(),
                    events = events.len(),
                    "Call succeeded"
                );
                Ok(Receipt { output, events })
            }
            Err(err) => {
                tracing::debug!(
                    method = call.method(),
                    caller = %caller.short(),
                    kind = err.kind(),
                    reason = %err,
                    "Call reverted"
                );
                Err(err)
            }
        }
    }

    pub fn call(&mut self, caller: Address, call: &CallData) -> Result<ReturnData, CallError> {
        self.execute(caller, call).map(|receipt| receipt.output)
    }

    /// Run `f` against a fresh overlay and commit it only on success.
    fn transact<T>(
        &mut self,
        f: impl FnOnce(&Self, &mut StorageTx<'_>) -> Result<T, CallError>,
    ) -> Result<(T, Vec<EmittedEvent>), CallError> {
        let now = self.clock.now();
        let mut tx = StorageTx::new(&self.store, now);
        let out = f(self, &mut tx)?;
        let changes = tx.into_changes();
        let events = self.store.apply(changes)?;
        Ok((out, events))
    }

    fn route(
        &self,
        tx: &mut StorageTx<'_>,
        caller: Address,
        call: &CallData,
    ) -> Result<ReturnData, CallError> {
        let slots = dispatch_slots();
        match call.method() {
            method::GET_IMPLEMENTATION => {
                Ok(address_value(tx.read::<Address>(slots.implementation)?))
            }
            method::GET_ADMIN => Ok(address_value(tx.read::<Address>(slots.admin)?)),
            method::UPGRADE_TO => {
                let params: UpgradeToParams = call.decode_params()?;
                self.upgrade(tx, caller, params.new_implementation)?;
                Ok(ReturnData::Null)
            }
            method::INITIALIZE => {
                self.initialize(tx, caller)?;
                Ok(ReturnData::Null)
            }
            _ => self.forward(tx, caller, call),
        }
    }

    fn initialize(&self, tx: &mut StorageTx<'_>, caller: Address) -> Result<(), CallError> {
        let slots = dispatch_slots();
        if tx.read::<bool>(slots.initialized)? {
            return Err(CallError::AlreadyInitialized);
        }

        let implementation: Address = tx.read(slots.implementation)?;
        let logic = self.resolve_target(implementation)?;
        tx.write(slots.admin, &caller);
        tx.write(slots.initialized, &true);

        let mut ctx = ExecutionContext::new(caller, self.address, tx);
        logic.initialize(&mut ctx)?;
        record_schema(tx, &logic.schema())?;

        tracing::info!(admin = %caller, logic = logic.name(), "Initialized dispatch layer");
        Ok(())
    }

    fn upgrade(
        &self,
        tx: &mut StorageTx<'_>,
        caller: Address,
        target: Address,
    ) -> Result<(), CallError> {
        let slots = dispatch_slots();
        let admin: Address = tx.read(slots.admin)?;
        if caller != admin {
            tracing::warn!(%caller, %target, "Rejected upgrade from non-administrator");
            return Err(CallError::Unauthorized { caller });
        }

        let logic = self.resolve_target(target).inspect_err(|err| {
            tracing::warn!(%target, reason = %err, "Rejected upgrade target");
        })?;

        let current: Address = tx.read(slots.implementation)?;
        if current == target {
            tracing::warn!(%target, "Upgrade target is already the active implementation");
            return Ok(());
        }

        let schema = logic.schema();
        let recorded: String = tx.read(slots.schema)?;
        if let Some(recorded) = parse_schema(&recorded)? {
            schema.check_upgrade_from(&recorded).map_err(|reason| {
                tracing::warn!(%target, %reason, "Rejected upgrade with incompatible storage schema");
                CallError::InvalidTarget { target, reason }
            })?;
        }

        tx.write(slots.implementation, &target);
        record_schema(tx, &schema)?;
        tracing::info!(
            from = %current,
            to = %target,
            logic = logic.name(),
            version = logic.version(),
            "Upgraded implementation"
        );
        Ok(())
    }

    fn forward(
        &self,
        tx: &mut StorageTx<'_>,
        caller: Address,
        call: &CallData,
    ) -> Result<ReturnData, CallError> {
        let implementation: Address = tx.read(dispatch_slots().implementation)?;
        if implementation.is_zero() {
            return Err(CallError::NotInitialized);
        }
        let logic = self.resolve_target(implementation)?;

        tracing::debug!(
            method = call.method(),
            caller = %caller.short(),
            logic = logic.name(),
            "Forwarding call"
        );
        let mut ctx = ExecutionContext::new(caller, self.address, tx);
        logic.execute(&mut ctx, call)
    }

    fn resolve_target(&self, target: Address) -> Result<Arc<dyn LedgerLogic>, CallError> {
        if target.is_zero() {
            return Err(CallError::InvalidTarget {
                target,
                reason: TargetRejection::ZeroAddress,
            });
        }
        self.registry.get(target).ok_or(CallError::InvalidTarget {
            target,
            reason: TargetRejection::NoCode,
        })
    }

    fn read_slot<T: SlotValue>(&self, slot: Slot) -> Result<T, CallError> {
        let bytes = self.store.load(&slot)?;
        Ok(T::decode(slot, bytes.as_deref())?)
    }
}

fn address_value(address: Address) -> ReturnData {
    ReturnData::String(address.to_string())
}

fn record_schema(tx: &mut StorageTx<'_>, schema: &StorageSchema) -> Result<(), CallError> {
    let json = schema.to_json().map_err(|e| CallError::Storage {
        message: e.to_string(),
    })?;
    tx.write(dispatch_slots().schema, &json);
    Ok(())
}

fn parse_schema(json: &str) -> Result<Option<StorageSchema>, CallError> {
    if json.is_empty() {
        return Ok(None);
    }
    StorageSchema::from_json(json)
        .map(Some)
        .map_err(|e| CallError::Storage {
            message: format!("recorded schema: {e}"),
        })
}
