//! CCM errors.

use core::fmt;

use thiserror::Error;

/// The error type for CCM.
///
/// Variants fall in three classes: bad parameters (rejected when a session
/// is built), misuse of a session (calls out of order, lengths that disagree
/// with the declared ones) and authentication failure. Only the last one is
/// expected to happen in a correct program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The block cipher does not use 128-bit blocks.
    #[error("CCM is only defined for 128-bit block ciphers, got {0}-byte blocks")]
    UnsupportedBlockSize(usize),
    /// Wrong nonce length.
    #[error("bad nonce length {0}, it must be in the range 7..=13 bytes")]
    InvalidNonceLen(usize),
    /// Wrong MAC length.
    #[error("bad MAC length {0}, allowed sizes are: 4, 6, 8, 10, 12, 14, 16")]
    InvalidMacLen(usize),
    /// The key does not fit the block cipher.
    #[error("bad key length for the block cipher")]
    InvalidKeyLen,
    /// The message is too long for the length field left by the nonce.
    #[error("message of {len} bytes exceeds the {max} bytes allowed by the nonce length")]
    MessageTooLong {
        /// Message length.
        len: u64,
        /// Largest length the nonce leaves room for.
        max: u64,
    },
    /// A call that the session cannot accept in its current phase.
    #[error("{op}() cannot be called {phase}")]
    InvalidState {
        /// The rejected call.
        op: Operation,
        /// What the session was doing.
        phase: &'static str,
    },
    /// More or fewer bytes were supplied than declared up front.
    #[error("{field} was declared as {declared} bytes but {actual} were supplied")]
    LengthMismatch {
        /// Which length disagrees.
        field: LengthField,
        /// Declared length.
        declared: u64,
        /// Bytes supplied so far.
        actual: u64,
    },
    /// The tag does not match: the message was tampered with or the key is
    /// wrong.
    #[error("MAC check failed")]
    VerificationFailed,
    /// The received tag is not valid hexadecimal.
    #[error("MAC tag is not valid hexadecimal")]
    MalformedTag,
}

impl Error {
    /// Whether this error rejects the message itself, as opposed to a bad
    /// parameter or a misused session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::VerificationFailed | Error::MalformedTag)
    }
}

impl From<Error> for aead::Error {
    fn from(_: Error) -> Self {
        aead::Error
    }
}

/// The session calls subject to ordering rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// [`CcmSession::update`](crate::CcmSession::update)
    Update,
    /// [`CcmSession::encrypt`](crate::CcmSession::encrypt)
    Encrypt,
    /// [`CcmSession::decrypt`](crate::CcmSession::decrypt)
    Decrypt,
    /// [`CcmSession::digest`](crate::CcmSession::digest)
    Digest,
    /// [`CcmSession::verify`](crate::CcmSession::verify)
    Verify,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Operation::Update => "update",
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
            Operation::Digest => "digest",
            Operation::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// A length that can be declared when a session is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthField {
    /// Total associated data length.
    AssociatedData,
    /// Total message (payload) length.
    Message,
}

impl fmt::Display for LengthField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LengthField::AssociatedData => write!(f, "associated data"),
            LengthField::Message => write!(f, "message"),
        }
    }
}
