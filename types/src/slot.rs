use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of one unit of persistent storage.
///
/// Slots form a 256-bit big-endian address space. Fixed fields of a logic
/// layout use small indices ([`Slot::from_index`]); mapping entries and
/// reserved bookkeeping slots are hash-derived and land far away from them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Slot([u8; Slot::LEN]);

impl Slot {
    pub const LEN: usize = 32;

    #[must_use]
    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn from_index(index: u64) -> Self {
        let mut bytes = [0u8; Self::LEN];
        bytes[Self::LEN - 8..].copy_from_slice(&index.to_be_bytes());
        Self(bytes)
    }

    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; Self::LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// The slot `n` positions after this one, wrapping at 2^256.
    #[must_use]
    pub fn offset(self, n: u64) -> Self {
        let mut bytes = self.0;
        let mut carry = u128::from(n);
        for byte in bytes.iter_mut().rev() {
            if carry == 0 {
                break;
            }
            let sum = u128::from(*byte) + (carry & 0xff);
            *byte = sum as u8;
            carry = (carry >> 8) + (sum >> 8);
        }
        Self(bytes)
    }

    /// The slot immediately before this one, wrapping at zero.
    #[must_use]
    pub fn predecessor(self) -> Self {
        let mut bytes = self.0;
        for byte in bytes.iter_mut().rev() {
            let (value, borrow) = byte.overflowing_sub(1);
            *byte = value;
            if !borrow {
                break;
            }
        }
        Self(bytes)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({self})")
    }
}
