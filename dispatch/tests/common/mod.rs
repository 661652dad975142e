//! Shared test fixtures
//!
//! A deployed ledger on a manual clock, with both voting logic versions
//! registered up front.

#![allow(dead_code)]

use std::sync::Arc;

use tally_dispatch::{CodeRegistry, Dispatcher, LedgerClient, ManualClock};
use tally_ledger::{VotingV1, VotingV2};
use tally_storage::{MemoryStore, SlotStore};
use tally_types::{Address, Slot, Timestamp};

/// Start of every scenario.
pub const T0: u64 = 1_700_000_000;
pub const DAY: i64 = 86_400;
pub const WEEK: i64 = 604_800;

pub fn admin() -> Address {
    Address::new([0xad; 20])
}

pub fn alice() -> Address {
    Address::new([0xa1; 20])
}

pub fn bob() -> Address {
    Address::new([0xb0; 20])
}

pub fn voter(n: u8) -> Address {
    let mut bytes = [0x5e; 20];
    bytes[19] = n;
    Address::new(bytes)
}

/// Registry with V1 then V2 deployed by the administrator. Deployment
/// order is fixed so addresses are the same on every call.
pub fn registry() -> (Arc<CodeRegistry>, Address, Address) {
    let registry = Arc::new(CodeRegistry::new());
    let v1 = registry.deploy_logic(admin(), VotingV1::new());
    let v2 = registry.deploy_logic(admin(), VotingV2::new());
    (registry, v1, v2)
}

pub struct Harness<S = MemoryStore> {
    pub dispatcher: Dispatcher<S>,
    pub registry: Arc<CodeRegistry>,
    pub clock: Arc<ManualClock>,
    pub v1: Address,
    pub v2: Address,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Every slot of the backing store, for byte-level comparisons.
    pub fn snapshot(&self) -> std::collections::BTreeMap<Slot, Vec<u8>> {
        self.dispatcher.store().snapshot()
    }
}

impl<S: SlotStore> Harness<S> {
    pub fn with_store(store: S) -> Self {
        let (registry, v1, v2) = registry();
        let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
        let dispatcher =
            Dispatcher::deploy(store, Arc::clone(&registry), clock.clone(), admin(), v1)
                .expect("deploy dispatcher");
        Self {
            dispatcher,
            registry,
            clock,
            v1,
            v2,
        }
    }

    pub fn client(&mut self, caller: Address) -> LedgerClient<'_, S> {
        self.dispatcher.client(caller)
    }

    pub fn advance(&self, secs: i64) {
        self.clock.advance(secs.unsigned_abs());
    }

    pub fn now(&self) -> Timestamp {
        use tally_dispatch::Clock;
        self.clock.now()
    }
}
