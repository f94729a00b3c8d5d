//! Variation of CBC-MAC used in CCM.
//!
//! The accumulator takes input of any length and zero-pads only when asked
//! to, so associated data and payload can each be aligned to the block
//! boundary independently. Input that arrives before the first block `B0`
//! is known is held back until [`CbcMac::ignite`].

use alloc::vec::Vec;
use core::mem;

use zeroize::Zeroize;

use crate::block::BlockCipher;
use crate::format::BLOCK_SIZE;

pub(crate) struct CbcMac {
    chain: [u8; BLOCK_SIZE],
    block: [u8; BLOCK_SIZE],
    filled: usize,
    backlog: Vec<u8>,
    ignited: bool,
}

impl CbcMac {
    pub(crate) fn new() -> Self {
        CbcMac {
            chain: [0u8; BLOCK_SIZE],
            block: [0u8; BLOCK_SIZE],
            filled: 0,
            backlog: Vec::new(),
            ignited: false,
        }
    }

    pub(crate) fn is_ignited(&self) -> bool {
        self.ignited
    }

    /// Starts the MAC. `preamble` is consumed *before* anything already
    /// passed to [`CbcMac::update`].
    pub(crate) fn ignite<C: BlockCipher>(
        &mut self,
        cipher: &C,
        preamble: &[&[u8]],
    ) {
        debug_assert!(!self.ignited, "CBC-MAC ignited twice");
        self.ignited = true;

        for part in preamble {
            self.absorb(cipher, part);
        }
        let mut backlog = mem::take(&mut self.backlog);
        self.absorb(cipher, &backlog);
        backlog.zeroize();
    }

    pub(crate) fn update<C: BlockCipher>(&mut self, cipher: &C, data: &[u8]) {
        if self.ignited {
            self.absorb(cipher, data);
        } else {
            self.backlog.extend_from_slice(data);
        }
    }

    /// Completes the open block with the least number of zero bytes
    /// (possibly none).
    pub(crate) fn zero_pad<C: BlockCipher>(&mut self, cipher: &C) {
        if self.filled > 0 {
            self.block[self.filled..].fill(0);
            self.compress(cipher);
        }
    }

    /// The CBC-MAC value. Only meaningful once the input is block aligned.
    pub(crate) fn mac(&self) -> [u8; BLOCK_SIZE] {
        debug_assert_eq!(0, self.filled, "CBC-MAC read mid-block");
        self.chain
    }

    fn absorb<C: BlockCipher>(&mut self, cipher: &C, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (BLOCK_SIZE - self.filled).min(data.len());
            self.block[self.filled..self.filled + take]
                .copy_from_slice(&data[..take]);
            self.filled += take;
            data = &data[take..];

            if self.filled == BLOCK_SIZE {
                self.compress(cipher);
            }
        }
    }

    fn compress<C: BlockCipher>(&mut self, cipher: &C) {
        for (t, b) in self.chain.iter_mut().zip(self.block.iter()) {
            *t ^= b;
        }
        cipher.encrypt_block(&mut self.chain);
        self.filled = 0;
    }
}

impl Drop for CbcMac {
    fn drop(&mut self) {
        self.chain.zeroize();
        self.block.zeroize();
        self.backlog.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::KeyInit;
    use aes::Aes128;

    fn cipher() -> Aes128 {
        Aes128::new(&hex!("C0C1C2C3C4C5C6C7C8C9CACBCCCDCECF").into())
    }

    // Plain CBC-MAC over whole blocks, for reference
    fn cbc_mac(cipher: &Aes128, data: &[u8]) -> [u8; BLOCK_SIZE] {
        let mut t = [0u8; BLOCK_SIZE];
        for chunk in data.chunks(BLOCK_SIZE) {
            for (t, d) in t.iter_mut().zip(chunk) {
                *t ^= d;
            }
            BlockCipher::encrypt_block(cipher, &mut t);
        }
        t
    }

    #[test]
    fn split_input_matches_whole() {
        let cipher = cipher();
        let data: Vec<u8> = (0u8..64).collect();

        let mut mac = CbcMac::new();
        mac.ignite(&cipher, &[]);
        for piece in data.chunks(7) {
            mac.update(&cipher, piece);
        }

        assert_eq!(cbc_mac(&cipher, &data), mac.mac());
    }

    #[test]
    fn preamble_goes_before_backlog() {
        let cipher = cipher();

        let mut mac = CbcMac::new();
        mac.update(&cipher, &[0xBB; 20]);
        assert!(!mac.is_ignited());
        mac.ignite(&cipher, &[&[0xAA; 10][..], &[0xAA; 2][..]]);
        mac.zero_pad(&cipher);

        let mut expected = [0xAA; 12].to_vec();
        expected.extend_from_slice(&[0xBB; 20]);
        assert_eq!(cbc_mac(&cipher, &expected), mac.mac());
    }

    #[test]
    fn zero_pad_only_open_block() {
        let cipher = cipher();

        let mut mac = CbcMac::new();
        mac.ignite(&cipher, &[&[0x11; 16][..]]);
        let aligned = mac.mac();
        mac.zero_pad(&cipher);
        assert_eq!(aligned, mac.mac());

        mac.update(&cipher, &[0x22; 3]);
        mac.zero_pad(&cipher);
        let mut padded = [0x11; 16].to_vec();
        padded.extend_from_slice(&[0x22, 0x22, 0x22]);
        padded.resize(32, 0);
        assert_eq!(cbc_mac(&cipher, &padded), mac.mac());
    }
}
