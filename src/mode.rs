//! One-shot CCM behind the [`aead`] traits.

use core::marker::PhantomData;

use aead::consts::{U0, U10, U11, U12, U13, U14, U16, U4, U6, U7, U8, U9};
use aead::generic_array::typenum::Unsigned;
use aead::generic_array::ArrayLength;
use aead::{AeadCore, AeadInPlace, Key, KeyInit, KeySizeUser, Nonce, Tag};
use aes::{Aes128, Aes192, Aes256};
use cipher::{BlockEncrypt, BlockSizeUser};
use zeroize::Zeroize;

use crate::ccm::{CcmConfig, CcmSession};
use crate::error::Error;

mod private {
    pub trait Sealed {}
}

/// Marker trait for valid AES-CCM MAC tag sizes.
pub trait CcmTagSize: ArrayLength<u8> + private::Sealed {}

/// Marker trait for valid AES-CCM nonce sizes.
pub trait CcmNonceSize: ArrayLength<u8> + private::Sealed {}

macro_rules! impl_sizes {
    ($marker:ident: $($size:ty),+) => {
        $(
            impl $marker for $size {}
        )+
    };
}

macro_rules! impl_sealed {
    ($($size:ty),+) => {
        $(
            impl private::Sealed for $size {}
        )+
    };
}

impl_sealed!(U4, U6, U7, U8, U9, U10, U11, U12, U13, U14, U16);
impl_sizes!(CcmTagSize: U4, U6, U8, U10, U12, U14, U16);
impl_sizes!(CcmNonceSize: U7, U8, U9, U10, U11, U12, U13);

/// The CCM mode with the tag size `M` and nonce size `N` fixed at compile
/// time.
///
/// Every call runs a fresh [`CcmSession`] with both lengths declared, so the
/// associated data is authenticated without being buffered.
#[derive(Clone)]
pub struct CcmMode<C, M, N> {
    cipher: C,
    _tag_size: PhantomData<M>,
    _nonce_size: PhantomData<N>,
}

/// AES-128 in CCM mode.
pub type Aes128Ccm<M, N> = CcmMode<Aes128, M, N>;
/// AES-192 in CCM mode.
pub type Aes192Ccm<M, N> = CcmMode<Aes192, M, N>;
/// AES-256 in CCM mode.
pub type Aes256Ccm<M, N> = CcmMode<Aes256, M, N>;

impl<C, M, N> CcmMode<C, M, N>
where
    M: CcmTagSize,
    N: CcmNonceSize,
{
    /// Wraps an already keyed block cipher.
    pub fn from_cipher(cipher: C) -> Self {
        CcmMode {
            cipher,
            _tag_size: PhantomData,
            _nonce_size: PhantomData,
        }
    }
}

impl<C, M, N> CcmMode<C, M, N>
where
    C: BlockEncrypt + BlockSizeUser<BlockSize = U16> + Clone,
    M: CcmTagSize,
    N: CcmNonceSize,
{
    fn session(
        &self,
        nonce: &Nonce<Self>,
        assoc_len: usize,
        msg_len: usize,
    ) -> Result<CcmSession<C>, Error> {
        let config = CcmConfig::new()
            .mac_len(M::USIZE)
            .assoc_len(assoc_len as u64)
            .msg_len(msg_len as u64);
        CcmSession::new(self.cipher.clone(), nonce, config)
    }
}

impl<C, M, N> KeySizeUser for CcmMode<C, M, N>
where
    C: KeySizeUser,
{
    type KeySize = C::KeySize;
}

impl<C, M, N> KeyInit for CcmMode<C, M, N>
where
    C: KeyInit,
    M: CcmTagSize,
    N: CcmNonceSize,
{
    fn new(key: &Key<Self>) -> Self {
        Self::from_cipher(C::new(key))
    }
}

impl<C, M, N> AeadCore for CcmMode<C, M, N>
where
    M: CcmTagSize,
    N: CcmNonceSize,
{
    type NonceSize = N;
    type TagSize = M;
    type CiphertextOverhead = U0;
}

impl<C, M, N> AeadInPlace for CcmMode<C, M, N>
where
    C: BlockEncrypt + BlockSizeUser<BlockSize = U16> + Clone,
    M: CcmTagSize,
    N: CcmNonceSize,
{
    fn encrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> aead::Result<Tag<Self>> {
        let mut session =
            self.session(nonce, associated_data.len(), buffer.len())?;
        session.update(associated_data)?;
        session.encrypt_in_place(buffer)?;
        let tag = session.digest()?;

        Ok(Tag::<Self>::clone_from_slice(tag.as_bytes()))
    }

    fn decrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &Tag<Self>,
    ) -> aead::Result<()> {
        let mut session =
            self.session(nonce, associated_data.len(), buffer.len())?;
        session.update(associated_data)?;
        session.decrypt_in_place(buffer)?;

        if let Err(err) = session.verify(tag.as_slice()) {
            buffer.zeroize();
            return Err(err.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aead::{Aead, Payload};
    use alloc::vec;
    use alloc::vec::Vec;

    // NIST SP 800-38C appendix C
    const NIST_KEY: [u8; 16] = hex!("404142434445464748494a4b4c4d4e4f");

    #[test]
    fn sp800_38c_example_1() {
        let ccm = Aes128Ccm::<U4, U7>::new(&NIST_KEY.into());
        let nonce = hex!("10111213141516");
        let payload = Payload {
            aad: &hex!("0001020304050607"),
            msg: &hex!("20212223"),
        };

        let ciphertext = ccm.encrypt(&nonce.into(), payload).unwrap();
        assert_eq!(&hex!("7162015b4dac255d")[..], ciphertext.as_slice());
    }

    #[test]
    fn sp800_38c_example_2() {
        let ccm = Aes128Ccm::<U6, U8>::new(&NIST_KEY.into());
        let nonce = hex!("1011121314151617");
        let aad = hex!("000102030405060708090a0b0c0d0e0f");
        let msg = hex!("202122232425262728292a2b2c2d2e2f");
        let expected = hex!("d2a1f0e051ea5f62081a7792073d593d1fc64fbfaccd");

        let ciphertext = ccm
            .encrypt(&nonce.into(), Payload { aad: &aad, msg: &msg })
            .unwrap();
        assert_eq!(&expected[..], ciphertext.as_slice());

        let plaintext = ccm
            .decrypt(
                &nonce.into(),
                Payload {
                    aad: &aad,
                    msg: &ciphertext,
                },
            )
            .unwrap();
        assert_eq!(&msg[..], plaintext.as_slice());
    }

    #[test]
    fn sp800_38c_example_3() {
        let ccm = Aes128Ccm::<U8, U12>::new(&NIST_KEY.into());
        let nonce = hex!("101112131415161718191a1b");
        let aad = hex!("000102030405060708090a0b0c0d0e0f10111213");
        let mut buffer: Vec<u8> =
            hex!("202122232425262728292a2b2c2d2e2f3031323334353637").to_vec();

        ccm.encrypt_in_place(&nonce.into(), &aad, &mut buffer)
            .unwrap();
        assert_eq!(
            &hex!(
                "e3b201a9f5b71a7a9b1ceaeccd97e70b"
                "6176aad9a4428aa5484392fbc1b09951"
            )[..],
            buffer.as_slice()
        );
    }

    #[test]
    fn rfc3610_packet_1() {
        let ccm = Aes128Ccm::<U8, U13>::new(
            &hex!("C0C1C2C3C4C5C6C7C8C9CACBCCCDCECF").into(),
        );
        let nonce = hex!("00000003020100A0A1A2A3A4A5");
        let aad = hex!("0001020304050607");
        let mut buffer =
            hex!("08090A0B0C0D0E0F101112131415161718191A1B1C1D1E");

        let tag = ccm
            .encrypt_in_place_detached(&nonce.into(), &aad, &mut buffer)
            .unwrap();
        assert_eq!(
            hex!("588C979A61C663D2F066D0C2C0F989806D5F6B61DAC384"),
            buffer
        );
        assert_eq!(hex!("17E8D12CFDF926E0"), tag.as_slice());
    }

    #[test]
    fn aes_256() {
        let ccm = Aes256Ccm::<U16, U12>::new(
            &hex!(
                "000102030405060708090a0b0c0d0e0f"
                "101112131415161718191a1b1c1d1e1f"
            )
            .into(),
        );
        let nonce = hex!("000102030405060708090a0b");
        let payload = Payload {
            aad: b"header",
            msg: b"attack at dawn",
        };

        let ciphertext = ccm.encrypt(&nonce.into(), payload).unwrap();
        assert_eq!(
            &hex!(
                "eba1cc775d44e9f6d8e9d5427a5e"
                "4ccfe806cc80a178884e1908dfc9e5cb"
            )[..],
            ciphertext.as_slice()
        );
    }

    #[test]
    fn aes_192() {
        let ccm = Aes192Ccm::<U12, U10>::new(
            &hex!("000102030405060708090a0b0c0d0e0f1011121314151617").into(),
        );
        let nonce = hex!("00010203040506070809");
        let payload = Payload {
            aad: b"header",
            msg: b"attack at dawn",
        };

        let ciphertext = ccm.encrypt(&nonce.into(), payload).unwrap();
        assert_eq!(
            &hex!("09ee724cf15fe753ce6122727c82de435cb2b50d4237af6b1409")[..],
            ciphertext.as_slice()
        );
    }

    #[test]
    fn failed_decryption_wipes_buffer() {
        let ccm = Aes128Ccm::<U8, U13>::new(&NIST_KEY.into());
        let nonce = [0x11; 13];
        let mut buffer = *b"some plaintext";

        let mut tag = ccm
            .encrypt_in_place_detached(&nonce.into(), b"", &mut buffer)
            .unwrap();
        tag[0] ^= 0x80;

        assert_eq!(
            aead::Error,
            ccm.decrypt_in_place_detached(&nonce.into(), b"", &mut buffer, &tag)
                .unwrap_err()
        );
        assert_eq!([0u8; 14], buffer);
    }

    #[test]
    fn message_too_long_for_nonce() {
        // A 13-byte nonce leaves a 2-byte length field
        let ccm = Aes128Ccm::<U16, U13>::new(&NIST_KEY.into());
        let nonce = [0u8; 13];
        let msg = vec![0u8; 0x1_0000];

        assert!(ccm.encrypt(&nonce.into(), &msg[..]).is_err());
        assert!(ccm.encrypt(&nonce.into(), &msg[1..]).is_ok());
    }
}
