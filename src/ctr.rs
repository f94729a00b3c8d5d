//! Variation of CTR mode used in CCM.
//!
//! The counter block is `[q - 1 | nonce | counter]` with a big-endian
//! counter filling the last `q` bytes. It starts at 0; the first keystream
//! block (`S0`) masks the tag, so the payload begins at counter 1.

use zeroize::Zeroize;

use crate::block::BlockCipher;
use crate::format::{self, BLOCK_SIZE};

pub(crate) struct Keystream {
    counter: [u8; BLOCK_SIZE],
    // First byte of the counter field
    counter_start: usize,
    block: [u8; BLOCK_SIZE],
    used: usize,
}

impl Keystream {
    pub(crate) fn new(nonce: &[u8]) -> Self {
        Keystream {
            counter: format::counter_block(nonce),
            counter_start: 1 + nonce.len(),
            block: [0u8; BLOCK_SIZE],
            used: BLOCK_SIZE,
        }
    }

    /// XORs the next `buf.len()` keystream bytes into `buf`.
    ///
    /// Calls may split the stream anywhere: the unused tail of the current
    /// keystream block carries over to the next call.
    pub(crate) fn apply<C: BlockCipher>(
        &mut self,
        cipher: &C,
        buf: &mut [u8],
    ) {
        for byte in buf.iter_mut() {
            if self.used == BLOCK_SIZE {
                self.refill(cipher);
            }
            *byte ^= self.block[self.used];
            self.used += 1;
        }
    }

    fn refill<C: BlockCipher>(&mut self, cipher: &C) {
        self.block.copy_from_slice(&self.counter);
        cipher.encrypt_block(&mut self.block);
        self.used = 0;
        self.increment();
    }

    // Wraps within the counter field, never into the nonce
    fn increment(&mut self) {
        for b in self.counter[self.counter_start..].iter_mut().rev() {
            *b = b.wrapping_add(1);
            if *b != 0 {
                break;
            }
        }
    }
}

impl Drop for Keystream {
    fn drop(&mut self) {
        self.block.zeroize();
    }
}
