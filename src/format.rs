//! Byte layouts fixed by SP 800-38C appendix A and RFC 3610.

pub(crate) const BLOCK_SIZE: usize = 16;
/// Shortest nonce CCM accepts.
pub const MIN_NONCE_LEN: usize = 7;
/// Longest nonce CCM accepts.
pub const MAX_NONCE_LEN: usize = 13;
/// Allowed MAC (tag) lengths in bytes.
pub const MAC_LENS: [usize; 7] = [4, 6, 8, 10, 12, 14, 16];
// Associated data shorter than 2^16 - 2^8 = 65280 bytes gets a bare 2-byte
// length
const SHORT_ASSOC_LIMIT: u64 = 0xFF00;

/// Width `q` in bytes of the message length field for a nonce of
/// `nonce_len` bytes.
pub(crate) const fn length_width(nonce_len: usize) -> usize {
    15 - nonce_len
}

/// Largest message length encodable in a `q`-byte length field.
pub(crate) const fn max_msg_len(q: usize) -> u64 {
    if q >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * q)) - 1
    }
}

/// Formats the first CBC-MAC block `B0`.
///
/// ```text
/// B0 = [FLAGS | nonce | msg_len], where:
///   FLAGS is 1 byte long
///   nonce is 15 - q bytes long
///   msg_len is q bytes long, big endian
/// The byte FLAGS is composed by the following 8 bits:
///   0-2 bits: q - 1
///   3-5 bits: mac length (encoded as: (mlen-2)/2)
///   6: Adata (0 if alen == 0, and 1 otherwise)
///   7: always 0
/// ```
pub(crate) fn first_block(
    nonce: &[u8],
    mac_len: usize,
    msg_len: u64,
    has_assoc: bool,
) -> [u8; BLOCK_SIZE] {
    let q = length_width(nonce.len());
    let mut b = [0u8; BLOCK_SIZE];

    b[0] = if has_assoc { 0x40 } else { 0 }
        | ((mac_len as u8 - 2) / 2) << 3
        | (q as u8 - 1);
    b[1..=nonce.len()].copy_from_slice(nonce);
    b[BLOCK_SIZE - q..].copy_from_slice(&msg_len.to_be_bytes()[8 - q..]);
    b
}

/// Formats the counter block prefix `[q - 1 | nonce]`, with room left for
/// the counter in the remaining `q` bytes.
pub(crate) fn counter_block(nonce: &[u8]) -> [u8; BLOCK_SIZE] {
    let q = length_width(nonce.len());
    let mut b = [0u8; BLOCK_SIZE];

    b[0] = q as u8 - 1;
    b[1..=nonce.len()].copy_from_slice(nonce);
    b
}

/// The encoded associated data length that follows `B0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssocLen {
    buf: [u8; 10],
    len: usize,
}

impl AssocLen {
    /// Encodes `a`, the total associated data length in bytes.
    pub fn encode(a: u64) -> Self {
        let mut buf = [0u8; 10];
        let len = if a == 0 {
            0
        } else if a < SHORT_ASSOC_LIMIT {
            buf[..2].copy_from_slice(&(a as u16).to_be_bytes());
            2
        } else if a <= u64::from(u32::MAX) {
            buf[..2].copy_from_slice(&[0xFF, 0xFE]);
            buf[2..6].copy_from_slice(&(a as u32).to_be_bytes());
            6
        } else {
            buf[..2].copy_from_slice(&[0xFF, 0xFF]);
            buf[2..].copy_from_slice(&a.to_be_bytes());
            10
        };

        AssocLen { buf, len }
    }
}

impl AsRef<[u8]> for AssocLen {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assoc_len_widths() {
        assert!(AssocLen::encode(0).as_ref().is_empty());
        assert_eq!(&hex!("0008"), AssocLen::encode(8).as_ref());
        // Last length that fits the short form
        assert_eq!(&hex!("FEFF"), AssocLen::encode(65279).as_ref());
        assert_eq!(
            &hex!("FFFE0000FF00"),
            AssocLen::encode(65280).as_ref()
        );
        assert_eq!(
            &hex!("FFFEFFFFFFFF"),
            AssocLen::encode(u64::from(u32::MAX)).as_ref()
        );
        assert_eq!(
            &hex!("FFFF0000000100000000"),
            AssocLen::encode(1 << 32).as_ref()
        );
    }

    #[test]
    fn length_field_bounds() {
        assert_eq!(2, length_width(13));
        assert_eq!(0xFFFF, max_msg_len(length_width(13)));
        assert_eq!(0xFF_FFFF, max_msg_len(length_width(12)));
        assert_eq!(8, length_width(7));
        assert_eq!(u64::MAX, max_msg_len(length_width(7)));
    }

    #[test]
    fn first_block_rfc3610_packet_1() {
        let nonce = hex!("00000003020100A0A1A2A3A4A5");
        assert_eq!(
            hex!("5900000003020100A0A1A2A3A4A50017"),
            first_block(&nonce, 8, 23, true)
        );
    }

    #[test]
    fn first_block_flags() {
        let nonce = [0xAA; 7];
        let b = first_block(&nonce, 16, 0x0102_0304_0506_0708, false);
        // No Adata, (16 - 2) / 2 = 7, q - 1 = 7
        assert_eq!(0b0011_1111, b[0]);
        assert_eq!(&nonce, &b[1..8]);
        assert_eq!(hex!("0102030405060708"), b[8..]);
    }

    #[test]
    fn counter_prefix() {
        let nonce = hex!("00000003020100A0A1A2A3A4A5");
        assert_eq!(
            hex!("0100000003020100A0A1A2A3A4A50000"),
            counter_block(&nonce)
        );
        assert_eq!(
            hex!("07AAAAAAAAAAAAAA0000000000000000"),
            counter_block(&[0xAA; 7])
        );
    }
}
