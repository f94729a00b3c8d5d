//! Streaming CCM session.

use alloc::string::String;
use alloc::vec::Vec;

use cipher::KeyInit;
use subtle::ConstantTimeEq;
use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::block::BlockCipher;
use crate::ctr::Keystream;
use crate::error::{Error, LengthField, Operation};
use crate::format::{
    self, AssocLen, BLOCK_SIZE, MAC_LENS, MAX_NONCE_LEN, MIN_NONCE_LEN,
};
use crate::mac::CbcMac;
use crate::tag::MacTag;

/// Parameters of a [`CcmSession`].
///
/// The MAC length defaults to 16 bytes. Declaring the message length lets
/// [`CcmSession::encrypt`] and [`CcmSession::decrypt`] be called more than
/// once; declaring both lengths lets the associated data be authenticated
/// as it arrives instead of being buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcmConfig {
    mac_len: usize,
    msg_len: Option<u64>,
    assoc_len: Option<u64>,
}

impl CcmConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        CcmConfig {
            mac_len: BLOCK_SIZE,
            msg_len: None,
            assoc_len: None,
        }
    }

    /// Sets the MAC length in bytes.
    ///
    /// Valid values are: 4, 6, 8, 10, 12, 14, 16.
    pub fn mac_len(mut self, mac_len: usize) -> Self {
        self.mac_len = mac_len;
        self
    }

    /// Declares the total length of the message to encrypt or decrypt.
    pub fn msg_len(mut self, msg_len: u64) -> Self {
        self.msg_len = Some(msg_len);
        self
    }

    /// Declares the total length of the associated data.
    pub fn assoc_len(mut self, assoc_len: u64) -> Self {
        self.assoc_len = Some(assoc_len);
        self
    }
}

impl Default for CcmConfig {
    fn default() -> Self {
        CcmConfig::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Seal,
    Open,
}

/// Where a session is in its life, which decides the calls it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    AssociatedData,
    // `more` is false once a single payload call has fixed the length
    Payload { direction: Direction, more: bool },
    Finalized(Direction),
}

impl Phase {
    fn permits(self, op: Operation) -> bool {
        match self {
            Phase::Init | Phase::AssociatedData => true,
            Phase::Payload {
                direction: Direction::Seal,
                more,
            } => op == Operation::Digest || (more && op == Operation::Encrypt),
            Phase::Payload {
                direction: Direction::Open,
                more,
            } => op == Operation::Verify || (more && op == Operation::Decrypt),
            Phase::Finalized(Direction::Seal) => op == Operation::Digest,
            Phase::Finalized(Direction::Open) => op == Operation::Verify,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Phase::Init => "on a new session",
            Phase::AssociatedData => "after update()",
            Phase::Payload {
                direction: Direction::Seal,
                more: true,
            } => "after encrypt()",
            Phase::Payload {
                direction: Direction::Seal,
                more: false,
            } => "after encrypt() when the message length was not declared",
            Phase::Payload {
                direction: Direction::Open,
                more: true,
            } => "after decrypt()",
            Phase::Payload {
                direction: Direction::Open,
                more: false,
            } => "after decrypt() when the message length was not declared",
            Phase::Finalized(Direction::Seal) => "after digest()",
            Phase::Finalized(Direction::Open) => "after verify()",
        }
    }
}

/// One CCM message, sealed or opened.
///
/// A session is single use: it is built for one key and nonce, fed the
/// associated data with [`update`](Self::update), then the payload with
/// [`encrypt`](Self::encrypt) or [`decrypt`](Self::decrypt), and finished
/// with [`digest`](Self::digest) (sender) or [`verify`](Self::verify)
/// (receiver). Calls made out of that order fail with
/// [`Error::InvalidState`].
///
/// The first block of the CBC-MAC encodes both the associated data length
/// and the message length. Lengths that are not declared through
/// [`CcmConfig`] are inferred from the data when the first payload call (or
/// the final call) is made; until then associated data is buffered.
///
/// ```rust
/// use aes::Aes128;
/// use ccm_session::{CcmConfig, CcmSession};
///
/// let key = [0x42; 16];
/// let nonce = [0x24; 12];
/// let config = CcmConfig::new().mac_len(8);
///
/// let mut sender = CcmSession::<Aes128>::new_from_slice(&key, &nonce, config)?;
/// sender.update(b"header")?;
/// let ciphertext = sender.encrypt(b"attack at dawn")?;
/// let tag = sender.digest()?;
///
/// let mut receiver =
///     CcmSession::<Aes128>::new_from_slice(&key, &nonce, config)?;
/// receiver.update(b"header")?;
/// let plaintext = receiver.decrypt_and_verify(&ciphertext, tag.as_bytes())?;
/// assert_eq!(&b"attack at dawn"[..], plaintext.as_slice());
/// # Ok::<(), ccm_session::Error>(())
/// ```
pub struct CcmSession<C> {
    cipher: C,
    nonce: [u8; MAX_NONCE_LEN],
    nonce_len: usize,
    mac_len: usize,
    msg_len: Option<u64>,
    assoc_len: Option<u64>,
    msg_fed: u64,
    assoc_fed: u64,
    assoc_closed: bool,
    mac: CbcMac,
    keystream: Keystream,
    s0: [u8; BLOCK_SIZE],
    tag: Option<MacTag>,
    phase: Phase,
}

impl<C: BlockCipher + KeyInit> CcmSession<C> {
    /// Creates a session, keying a new block cipher instance from `key`.
    pub fn new_from_slice(
        key: &[u8],
        nonce: &[u8],
        config: CcmConfig,
    ) -> Result<Self, Error> {
        let cipher = C::new_from_slice(key).map_err(|_| Error::InvalidKeyLen)?;
        Self::new(cipher, nonce, config)
    }
}

impl<C: BlockCipher> CcmSession<C> {
    /// Creates a session over `cipher`.
    ///
    /// The nonce must be 7 to 13 bytes long and never be reused with the same
    /// key. A shorter nonce leaves more room for the message length:
    /// `15 - nonce.len()` bytes.
    pub fn new(
        cipher: C,
        nonce: &[u8],
        config: CcmConfig,
    ) -> Result<Self, Error> {
        let block_size = cipher.block_size();
        if block_size != BLOCK_SIZE {
            return Err(Error::UnsupportedBlockSize(block_size));
        }
        if !(MIN_NONCE_LEN..=MAX_NONCE_LEN).contains(&nonce.len()) {
            return Err(Error::InvalidNonceLen(nonce.len()));
        }
        if !MAC_LENS.contains(&config.mac_len) {
            return Err(Error::InvalidMacLen(config.mac_len));
        }
        let max = format::max_msg_len(format::length_width(nonce.len()));
        if let Some(len) = config.msg_len {
            if len > max {
                return Err(Error::MessageTooLong { len, max });
            }
        }

        let mut nonce_buf = [0u8; MAX_NONCE_LEN];
        nonce_buf[..nonce.len()].copy_from_slice(nonce);

        let mut session = CcmSession {
            cipher,
            nonce: nonce_buf,
            nonce_len: nonce.len(),
            mac_len: config.mac_len,
            msg_len: config.msg_len,
            assoc_len: config.assoc_len,
            msg_fed: 0,
            assoc_fed: 0,
            assoc_closed: false,
            mac: CbcMac::new(),
            keystream: Keystream::new(nonce),
            s0: [0u8; BLOCK_SIZE],
            tag: None,
            phase: Phase::Init,
        };
        session.ensure_started();

        Ok(session)
    }

    /// The nonce.
    pub fn nonce(&self) -> &[u8] {
        &self.nonce[..self.nonce_len]
    }

    /// The MAC length in bytes.
    pub fn mac_len(&self) -> usize {
        self.mac_len
    }

    /// The message length, once declared or inferred.
    pub fn msg_len(&self) -> Option<u64> {
        self.msg_len
    }

    /// The associated data length, once declared or inferred.
    pub fn assoc_len(&self) -> Option<u64> {
        self.assoc_len
    }

    /// Authenticates associated data.
    ///
    /// Associated data is not encrypted, but any change to it makes
    /// verification fail. It may be split across any number of calls, all of
    /// which must come before the payload.
    pub fn update(&mut self, assoc_data: &[u8]) -> Result<(), Error> {
        self.check(Operation::Update)?;

        let fed = self.assoc_fed + assoc_data.len() as u64;
        if let Some(declared) = self.assoc_len {
            if fed > declared {
                return Err(Error::LengthMismatch {
                    field: LengthField::AssociatedData,
                    declared,
                    actual: fed,
                });
            }
        }

        self.phase = Phase::AssociatedData;
        self.assoc_fed = fed;
        self.mac.update(&self.cipher, assoc_data);
        Ok(())
    }

    /// Encrypts `plaintext`.
    ///
    /// Can be called only once unless the message length was declared, in
    /// which case `encrypt(a) + encrypt(b)` equals `encrypt(a + b)`.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let mut buffer = plaintext.to_vec();
        self.encrypt_in_place(&mut buffer)?;
        Ok(buffer)
    }

    /// Encrypts `buffer` in place. See [`encrypt`](Self::encrypt).
    pub fn encrypt_in_place(&mut self, buffer: &mut [u8]) -> Result<(), Error> {
        self.begin_payload(Direction::Seal, buffer.len())?;
        self.mac.update(&self.cipher, buffer);
        self.keystream.apply(&self.cipher, buffer);
        Ok(())
    }

    /// Decrypts `ciphertext`.
    ///
    /// The plaintext returned here is not authenticated yet. Do not act on
    /// it before [`verify`](Self::verify) succeeds, or use
    /// [`decrypt_and_verify`](Self::decrypt_and_verify).
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let mut buffer = ciphertext.to_vec();
        self.decrypt_in_place(&mut buffer)?;
        Ok(buffer)
    }

    /// Decrypts `buffer` in place. See [`decrypt`](Self::decrypt).
    pub fn decrypt_in_place(&mut self, buffer: &mut [u8]) -> Result<(), Error> {
        self.begin_payload(Direction::Open, buffer.len())?;
        // CCM authenticates the plaintext, so the receiver decrypts first
        self.keystream.apply(&self.cipher, buffer);
        self.mac.update(&self.cipher, buffer);
        Ok(())
    }

    /// Computes the MAC tag to send along with the ciphertext.
    ///
    /// Later calls return the same tag.
    pub fn digest(&mut self) -> Result<MacTag, Error> {
        self.check(Operation::Digest)?;
        let tag = self.finalize()?;
        self.phase = Phase::Finalized(Direction::Seal);
        Ok(tag)
    }

    /// Like [`digest`](Self::digest), as lowercase hexadecimal.
    pub fn hex_digest(&mut self) -> Result<String, Error> {
        Ok(hex::encode(self.digest()?))
    }

    /// Checks the MAC tag received with the ciphertext.
    ///
    /// Fails with [`Error::VerificationFailed`] if the message was tampered
    /// with or the key is wrong; the message must then be rejected as a
    /// whole. The comparison is constant time.
    pub fn verify(&mut self, received_mac_tag: &[u8]) -> Result<(), Error> {
        self.check(Operation::Verify)?;
        let tag = self.finalize()?;
        self.phase = Phase::Finalized(Direction::Open);

        if bool::from(tag.as_bytes().ct_eq(received_mac_tag)) {
            Ok(())
        } else {
            debug!(mac_len = self.mac_len, "CCM MAC check failed");
            Err(Error::VerificationFailed)
        }
    }

    /// Like [`verify`](Self::verify), for a tag in hexadecimal.
    pub fn hex_verify(&mut self, hex_mac_tag: &str) -> Result<(), Error> {
        let received =
            hex::decode(hex_mac_tag).map_err(|_| Error::MalformedTag)?;
        self.verify(&received)
    }

    /// [`encrypt`](Self::encrypt) and [`digest`](Self::digest) in one step.
    pub fn encrypt_and_digest(
        &mut self,
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, MacTag), Error> {
        let ciphertext = self.encrypt(plaintext)?;
        let tag = self.digest()?;
        Ok((ciphertext, tag))
    }

    /// [`decrypt`](Self::decrypt) and [`verify`](Self::verify) in one step.
    ///
    /// The plaintext is only returned once the tag checks out; otherwise it
    /// is wiped.
    pub fn decrypt_and_verify(
        &mut self,
        ciphertext: &[u8],
        received_mac_tag: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mut plaintext = ciphertext.to_vec();
        self.decrypt_in_place(&mut plaintext)?;

        if let Err(err) = self.verify(received_mac_tag) {
            plaintext.zeroize();
            return Err(err);
        }
        Ok(plaintext)
    }

    fn check(&self, op: Operation) -> Result<(), Error> {
        if self.phase.permits(op) {
            return Ok(());
        }

        let phase = self.phase.describe();
        debug!(%op, phase, "rejected out of order CCM call");
        Err(Error::InvalidState { op, phase })
    }

    // Ignites the CBC-MAC with B0 and the encoded associated data length,
    // and draws S0 from the keystream. Does nothing until both lengths are
    // known, or once done.
    fn ensure_started(&mut self) {
        if self.mac.is_ignited() {
            return;
        }
        let (Some(msg_len), Some(assoc_len)) = (self.msg_len, self.assoc_len)
        else {
            return;
        };

        let b0 = format::first_block(
            &self.nonce[..self.nonce_len],
            self.mac_len,
            msg_len,
            assoc_len > 0,
        );
        let encoded_assoc_len = AssocLen::encode(assoc_len);
        self.mac
            .ignite(&self.cipher, &[&b0[..], encoded_assoc_len.as_ref()]);

        // S0 is the counter 0 block, reserved for the tag
        self.keystream.apply(&self.cipher, &mut self.s0);

        trace!(
            nonce_len = self.nonce_len,
            mac_len = self.mac_len,
            msg_len,
            assoc_len,
            "CCM session started"
        );
    }

    fn begin_payload(
        &mut self,
        direction: Direction,
        len: usize,
    ) -> Result<(), Error> {
        let op = match direction {
            Direction::Seal => Operation::Encrypt,
            Direction::Open => Operation::Decrypt,
        };
        self.check(op)?;

        let len = len as u64;
        let msg_len = match self.msg_len {
            Some(declared) => declared,
            None => {
                let max = self.max_msg_len();
                if len > max {
                    return Err(Error::MessageTooLong { len, max });
                }
                len
            }
        };
        let fed = self.msg_fed + len;
        if fed > msg_len {
            return Err(Error::LengthMismatch {
                field: LengthField::Message,
                declared: msg_len,
                actual: fed,
            });
        }
        if let Some(declared) = self.assoc_len {
            if !self.assoc_closed && self.assoc_fed != declared {
                return Err(Error::LengthMismatch {
                    field: LengthField::AssociatedData,
                    declared,
                    actual: self.assoc_fed,
                });
            }
        }

        self.phase = Phase::Payload {
            direction,
            more: self.msg_len.is_some(),
        };
        self.msg_len = Some(msg_len);
        if self.assoc_len.is_none() {
            self.assoc_len = Some(self.assoc_fed);
        }
        self.ensure_started();

        if !self.assoc_closed {
            // Associated data is padded to the block boundary before the
            // first payload byte
            self.mac.zero_pad(&self.cipher);
            self.assoc_closed = true;
        }
        self.msg_fed = fed;
        Ok(())
    }

    fn finalize(&mut self) -> Result<MacTag, Error> {
        if let Some(tag) = self.tag {
            return Ok(tag);
        }

        let assoc_len = self.assoc_len.unwrap_or(self.assoc_fed);
        if self.assoc_fed != assoc_len {
            return Err(Error::LengthMismatch {
                field: LengthField::AssociatedData,
                declared: assoc_len,
                actual: self.assoc_fed,
            });
        }
        let msg_len = self.msg_len.unwrap_or(0);
        if self.msg_fed != msg_len {
            return Err(Error::LengthMismatch {
                field: LengthField::Message,
                declared: msg_len,
                actual: self.msg_fed,
            });
        }

        self.assoc_len = Some(assoc_len);
        self.msg_len = Some(msg_len);
        self.ensure_started();

        // Pads whichever of associated data or payload came last
        self.mac.zero_pad(&self.cipher);
        let tag = MacTag::mask(&self.mac.mac(), &self.s0, self.mac_len);
        self.tag = Some(tag);
        Ok(tag)
    }

    fn max_msg_len(&self) -> u64 {
        format::max_msg_len(format::length_width(self.nonce_len))
    }
}

impl<C> Drop for CcmSession<C> {
    fn drop(&mut self) {
        self.s0.zeroize();
    }
}
