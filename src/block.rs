//! The block-cipher seam CCM is built on.

use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, BlockSizeUser};

/// A block cipher usable underneath CCM.
///
/// CCM only ever runs the cipher forwards: both the CBC-MAC and the counter
/// keystream are made of block encryptions. Every [`BlockEncrypt`]
/// implementor (e.g. [`aes::Aes128`]) gets this trait for free.
pub trait BlockCipher {
    /// Block length in bytes. CCM accepts only 16.
    fn block_size(&self) -> usize;

    /// Encrypts `block` in place. `block` is exactly `block_size()` bytes.
    fn encrypt_block(&self, block: &mut [u8]);
}

impl<C: BlockEncrypt> BlockCipher for C {
    fn block_size(&self) -> usize {
        <C as BlockSizeUser>::block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        BlockEncrypt::encrypt_block(self, GenericArray::from_mut_slice(block));
    }
}
