//! A pure-Rust, `#![no_std]` implementation of the CCM mode of operation
//! with a streaming, call-ordered session API on top of [RustCrypto's AES].
//!
//! ## Overview
//! CCM (for "Counter with CBC-MAC") mode is a NIST approved mode of operation
//! defined in [SP 800-38C]. It turns a 128-bit block cipher into an
//! authenticated encryption scheme: the payload is encrypted and
//! authenticated, the associated data is only authenticated.
//!
//! This crate offers two interfaces:
//! 1. [`CcmSession`], which processes one message incrementally. Associated
//!    data is fed with `update`, the payload with `encrypt` or `decrypt`, and
//!    the tag is produced by `digest` or checked by `verify`. Calls that do
//!    not follow this order are rejected with [`Error::InvalidState`].
//! 2. [`CcmMode`], which implements the [`Aead`] trait family for a tag and
//!    nonce size fixed at compile time, so it can be used effortlessly
//!    together with other implementations.
//!
//! Nonces of 7 to 13 bytes are accepted. The shorter the nonce, the longer
//! the message can be: a nonce of `n` bytes leaves `15 - n` bytes to encode
//! the message length. Associated data can be of any length.
//!
//! ## Usage
//! ```rust
//! use aes::Aes128;
//! use ccm_session::{CcmConfig, CcmSession};
//!
//! let key = [
//!     0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA,
//!     0xCB, 0xCC, 0xCD, 0xCE, 0xCF,
//! ];
//! let nonce = [
//!     0x00, 0x00, 0x00, 0x03, 0x02, 0x01, 0x00, 0xA0, 0xA1, 0xA2, 0xA3,
//!     0xA4, 0xA5,
//! ];
//! let associated_data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
//! let msg = [
//!     0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10, 0x11, 0x12,
//!     0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D,
//!     0x1E,
//! ];
//!
//! // Declaring the message length allows splitting it across calls
//! let config = CcmConfig::new().mac_len(8).msg_len(msg.len() as u64);
//!
//! let mut cipher = CcmSession::<Aes128>::new_from_slice(&key, &nonce, config)
//!     .unwrap();
//! cipher.update(&associated_data).unwrap();
//! let mut ciphertext = cipher.encrypt(&msg[..10]).unwrap();
//! ciphertext.extend(cipher.encrypt(&msg[10..]).unwrap());
//! let tag = cipher.digest().unwrap();
//!
//! let mut cipher = CcmSession::<Aes128>::new_from_slice(&key, &nonce, config)
//!     .unwrap();
//! cipher.update(&associated_data).unwrap();
//! let plaintext = cipher
//!     .decrypt_and_verify(&ciphertext, tag.as_bytes())
//!     .unwrap();
//!
//! assert_eq!(&msg[..], plaintext.as_slice());
//! ```
//!
//! The same through the [`Aead`] trait:
//!
//! ```rust
//! use ccm_session::{
//!     aead::{
//!         consts::{U13, U8},
//!         Aead, KeyInit, Payload,
//!     },
//!     Aes128Ccm,
//! };
//!
//! let key = [0x42; 16];
//! let nonce = [0x24; 13];
//!
//! // `U8` is the tag size and `U13` the nonce size, as `typenum` unsigneds
//! let ccm = Aes128Ccm::<U8, U13>::new(&key.into());
//!
//! let payload = Payload {
//!     aad: b"header",
//!     msg: b"attack at dawn",
//! };
//! let ciphertext = ccm.encrypt(&nonce.into(), payload).unwrap();
//!
//! let payload = Payload {
//!     aad: b"header",
//!     msg: &ciphertext,
//! };
//! let plaintext = ccm.decrypt(&nonce.into(), payload).unwrap();
//!
//! assert_eq!(&b"attack at dawn"[..], plaintext.as_slice());
//! ```
//!
//! ## In-place Usage
//! [`CcmSession::encrypt_in_place`], [`CcmSession::decrypt_in_place`] and the
//! `_in_place` methods of [`aead::AeadInPlace`] work on caller-owned buffers.
//! With the `heapless` feature, [`aead::Buffer`] is also implemented for
//! [`heapless::Vec`] (re-exported as `aead::heapless::Vec`).
//!
//! ## Security
//! The MAC length is an important parameter to estimate the security
//! against collision attacks (that aim at finding different messages that
//! produce the same authentication tag).
//! The implementation accepts any even integer between 4 and 16, as suggested
//! in [SP 800-38C].
//!
//! Tags are compared in constant time. [`CcmSession::decrypt`] hands out
//! plaintext before the tag is checked; callers that cannot hold it back
//! until [`CcmSession::verify`] succeeds should use
//! [`CcmSession::decrypt_and_verify`], which only releases it afterwards.
//!
//! [RFC 3610], which also specifies CCM, presents a few relevant security
//! suggestions, such as:
//! * It is recommended that most applications use a MAC length greater than 8.
//! * The usage of the same nonce for two different messages which are
//!   encrypted with the same key destroys the security of CCM mode.
//!
//! [RustCrypto's AES]: https://github.com/RustCrypto/block-ciphers
//! [`Aead`]: https://docs.rs/aead/latest/aead/trait.Aead.html
//! [SP 800-38C]: https://csrc.nist.gov/publications/detail/sp/800-38c/final
//! [RFC 3610]: https://tools.ietf.org/html/rfc3610
//! [`aead::Buffer`]: https://docs.rs/aead/latest/aead/trait.Buffer.html
//! [`heapless::Vec`]: https://docs.rs/heapless/latest/heapless/struct.Vec.html

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

mod block;
mod ccm;
mod ctr;
mod error;
mod format;
mod mac;
mod mode;
mod tag;

pub use aead;
pub use block::BlockCipher;
pub use ccm::{CcmConfig, CcmSession};
pub use error::{Error, LengthField, Operation};
pub use format::{AssocLen, MAC_LENS, MAX_NONCE_LEN, MIN_NONCE_LEN};
pub use mode::{
    Aes128Ccm, Aes192Ccm, Aes256Ccm, CcmMode, CcmNonceSize, CcmTagSize,
};
pub use tag::MacTag;
