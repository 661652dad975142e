use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use sha2::{Digest, Sha256};

use tally_ledger::LedgerLogic;
use tally_types::Address;

/// Deployed logic modules, addressed like any other account.
///
/// An address "has code" exactly when a module is registered under it.
/// Addresses come from a deployer and a registry-wide nonce, so deploying
/// the same modules in the same order yields the same addresses again.
#[derive(Default)]
pub struct CodeRegistry {
    code: RwLock<HashMap<Address, Arc<dyn LedgerLogic>>>,
    nonce: AtomicU64,
}

impl CodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `logic` and return its address.
    pub fn deploy(&self, deployer: Address, logic: Arc<dyn LedgerLogic>) -> Address {
        let address = self.next_address(deployer);
        tracing::info!(
            %address,
            logic = logic.name(),
            version = logic.version(),
            "Deployed ledger logic"
        );
        self.code
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address, logic);
        address
    }

    pub fn deploy_logic<L: LedgerLogic + 'static>(&self, deployer: Address, logic: L) -> Address {
        self.deploy(deployer, Arc::new(logic))
    }

    #[must_use]
    pub fn get(&self, address: Address) -> Option<Arc<dyn LedgerLogic>> {
        self.code
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&address)
            .cloned()
    }

    #[must_use]
    pub fn has_code(&self, address: Address) -> bool {
        self.code
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.code.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserve a fresh address for `deployer`.
    pub(crate) fn next_address(&self, deployer: Address) -> Address {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        derive_address(deployer, nonce)
    }

    /// The nonce the next deployment will use, without consuming it.
    pub(crate) fn pending_nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Consume `nonce` if no other deployment took it first.
    pub(crate) fn claim_nonce(&self, nonce: u64) -> bool {
        self.nonce
            .compare_exchange(nonce, nonce + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// The low 20 bytes of `sha256(deployer || nonce)`.
#[must_use]
pub fn derive_address(deployer: Address, nonce: u64) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(deployer.as_bytes());
    hasher.update(nonce.to_be_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; Address::LEN];
    bytes.copy_from_slice(&digest[digest.len() - Address::LEN..]);
    Address::new(bytes)
}
