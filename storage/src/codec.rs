//! Encoding of typed values into slot bytes.
//!
//! The zero value of every type encodes to an empty byte string, and an
//! empty or absent slot decodes to the zero value. A slot that was never
//! written and a slot reset to zero are therefore indistinguishable.

use tally_types::{Address, ProposalId, Slot, Timestamp};

use crate::StoreError;

pub trait SlotValue: Sized {
    fn encode(&self) -> Vec<u8>;

    /// Decode the bytes stored at `slot` (`None` for an absent slot).
    fn decode(slot: Slot, bytes: Option<&[u8]>) -> Result<Self, StoreError>;
}

fn present(bytes: Option<&[u8]>) -> Option<&[u8]> {
    bytes.filter(|b| !b.is_empty())
}

impl SlotValue for u64 {
    fn encode(&self) -> Vec<u8> {
        if *self == 0 {
            Vec::new()
        } else {
            self.to_be_bytes().to_vec()
        }
    }

    fn decode(slot: Slot, bytes: Option<&[u8]>) -> Result<Self, StoreError> {
        let Some(bytes) = present(bytes) else {
            return Ok(0);
        };
        let array: [u8; 8] = bytes.try_into().map_err(|_| StoreError::CorruptValue {
            slot,
            len: bytes.len(),
            expected: "u64 (8 bytes)",
        })?;
        Ok(u64::from_be_bytes(array))
    }
}

impl SlotValue for bool {
    fn encode(&self) -> Vec<u8> {
        if *self { vec![1] } else { Vec::new() }
    }

    fn decode(slot: Slot, bytes: Option<&[u8]>) -> Result<Self, StoreError> {
        match present(bytes) {
            None => Ok(false),
            Some([1]) => Ok(true),
            Some(other) => Err(StoreError::CorruptValue {
                slot,
                len: other.len(),
                expected: "bool (1 byte)",
            }),
        }
    }
}

impl SlotValue for Address {
    fn encode(&self) -> Vec<u8> {
        if self.is_zero() {
            Vec::new()
        } else {
            self.as_bytes().to_vec()
        }
    }

    fn decode(slot: Slot, bytes: Option<&[u8]>) -> Result<Self, StoreError> {
        let Some(bytes) = present(bytes) else {
            return Ok(Address::ZERO);
        };
        Address::from_slice(bytes).ok_or(StoreError::CorruptValue {
            slot,
            len: bytes.len(),
            expected: "address (20 bytes)",
        })
    }
}

impl SlotValue for String {
    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn decode(slot: Slot, bytes: Option<&[u8]>) -> Result<Self, StoreError> {
        let Some(bytes) = present(bytes) else {
            return Ok(String::new());
        };
        String::from_utf8(bytes.to_vec()).map_err(|_| StoreError::InvalidText { slot })
    }
}

impl SlotValue for ProposalId {
    fn encode(&self) -> Vec<u8> {
        self.value().encode()
    }

    fn decode(slot: Slot, bytes: Option<&[u8]>) -> Result<Self, StoreError> {
        u64::decode(slot, bytes).map(ProposalId::new)
    }
}

impl SlotValue for Timestamp {
    fn encode(&self) -> Vec<u8> {
        self.as_secs().encode()
    }

    fn decode(slot: Slot, bytes: Option<&[u8]>) -> Result<Self, StoreError> {
        u64::decode(slot, bytes).map(Timestamp::from_secs)
    }
}
