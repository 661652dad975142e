//! Slot derivation.
//!
//! Logic layouts claim small slot indices starting from zero. Everything
//! else is hash-derived so it cannot collide with them:
//!
//! - Reserved bookkeeping slots are `sha256(label) - 1`, a slot with no
//!   known hash preimage.
//! - Mapping entries are `sha256(key || base)`, with the key left-padded to
//!   32 bytes. Nested mappings derive the inner base from the outer entry.
//! - Struct fields occupy consecutive slots from their entry slot.

use sha2::{Digest, Sha256};

use tally_types::{Address, Slot};

/// A bookkeeping slot derived from a fixed, namespaced label.
#[must_use]
pub fn reserved_slot(label: &str) -> Slot {
    let digest = Sha256::digest(label.as_bytes());
    let mut bytes = [0u8; Slot::LEN];
    bytes.copy_from_slice(&digest);
    Slot::new(bytes).predecessor()
}

/// The entry slot of `key` in the mapping rooted at `base`.
#[must_use]
pub fn mapping_slot(base: Slot, key: &[u8]) -> Slot {
    let mut padded = [0u8; Slot::LEN];
    let take = key.len().min(Slot::LEN);
    padded[Slot::LEN - take..].copy_from_slice(&key[key.len() - take..]);

    let mut hasher = Sha256::new();
    hasher.update(padded);
    hasher.update(base.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; Slot::LEN];
    bytes.copy_from_slice(&digest);
    Slot::new(bytes)
}

#[must_use]
pub fn mapping_slot_u64(base: Slot, key: u64) -> Slot {
    mapping_slot(base, &key.to_be_bytes())
}

#[must_use]
pub fn mapping_slot_address(base: Slot, key: Address) -> Slot {
    mapping_slot(base, key.as_bytes())
}
