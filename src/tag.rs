//! The authentication tag produced by a CCM session.

use core::fmt;

use subtle::{Choice, ConstantTimeEq};

use crate::format::BLOCK_SIZE;

/// A CCM MAC tag of 4 to 16 bytes.
///
/// Equality is constant time.
#[derive(Clone, Copy)]
pub struct MacTag {
    bytes: [u8; BLOCK_SIZE],
    len: usize,
}

impl MacTag {
    /// `MSB_Tlen(mac ^ s0)`
    pub(crate) fn mask(
        mac: &[u8; BLOCK_SIZE],
        s0: &[u8; BLOCK_SIZE],
        len: usize,
    ) -> Self {
        let mut bytes = [0u8; BLOCK_SIZE];
        for i in 0..len {
            bytes[i] = mac[i] ^ s0[i];
        }
        MacTag { bytes, len }
    }

    /// The tag bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Tag length in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }
}

impl AsRef<[u8]> for MacTag {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ConstantTimeEq for MacTag {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.as_bytes().ct_eq(other.as_bytes())
    }
}

impl PartialEq for MacTag {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for MacTag {}

impl fmt::LowerHex for MacTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.as_bytes() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for MacTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl fmt::Debug for MacTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MacTag({:x})", self)
    }
}
