//! Sender key message envelope.
//!
//! ```text
//! [version:1][CBOR body { key_id, iteration, ciphertext }][signature:64]
//! ```
//!
//! The version byte carries the message version in its high nibble and the
//! current version in its low nibble. The signature covers every byte before
//! it, so the key id, iteration and ciphertext are all authenticated.
//!
//! # Invariants
//!
//! - `serialized` always holds the exact bytes the signature was computed
//!   over (plus the signature). A decoded message keeps the received bytes
//!   instead of re-encoding, so verification never depends on CBOR encoding
//!   being canonical.

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// Current sender key message version
pub const CURRENT_VERSION: u8 = 3;

/// Size of the trailing Ed25519 signature
pub const SIGNATURE_SIZE: usize = 64;

/// Maximum serialized message size (16 MB)
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Minimum serialized size: version byte plus signature
const MIN_MESSAGE_SIZE: usize = 1 + SIGNATURE_SIZE;

/// Version byte written on every outgoing message.
pub const fn version_byte() -> u8 {
    (CURRENT_VERSION << 4) | CURRENT_VERSION
}

#[derive(Serialize)]
struct MessageBodyRef<'a> {
    key_id: u32,
    iteration: u32,
    ciphertext: &'a [u8],
}

#[derive(Deserialize)]
struct MessageBody {
    key_id: u32,
    iteration: u32,
    ciphertext: Vec<u8>,
}

/// A signed sender key message.
///
/// Built by the sender with [`SenderKeyMessage::new`] and parsed by receivers
/// with [`SenderKeyMessage::decode`]. Parsing does NOT verify the signature;
/// receivers verify [`signed_bytes`](Self::signed_bytes) against
/// [`signature`](Self::signature) with the sender's public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderKeyMessage {
    version: u8,
    key_id: u32,
    iteration: u32,
    ciphertext: Vec<u8>,
    serialized: Vec<u8>,
}

impl SenderKeyMessage {
    /// Build and sign a message.
    ///
    /// `sign` receives the serialized version byte and body and returns the
    /// signature appended to them.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if the body cannot be serialized
    /// - `ProtocolError::MessageTooLarge` if the result exceeds
    ///   [`MAX_MESSAGE_SIZE`]
    pub fn new<F>(key_id: u32, iteration: u32, ciphertext: Vec<u8>, sign: F) -> Result<Self>
    where
        F: FnOnce(&[u8]) -> [u8; SIGNATURE_SIZE],
    {
        let body = MessageBodyRef { key_id, iteration, ciphertext: &ciphertext };

        let mut serialized = Vec::with_capacity(MIN_MESSAGE_SIZE + 16 + ciphertext.len() * 2);
        serialized.put_u8(version_byte());
        ciborium::ser::into_writer(&body, (&mut serialized).writer())
            .map_err(|e| ProtocolError::CborEncode(e.to_string()))?;

        let signature = sign(&serialized);
        serialized.put_slice(&signature);

        if serialized.len() > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: serialized.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        Ok(Self { version: CURRENT_VERSION, key_id, iteration, ciphertext, serialized })
    }

    /// Parse a message from network bytes.
    ///
    /// # Errors
    ///
    /// - `MessageTooLarge` if `bytes` exceeds [`MAX_MESSAGE_SIZE`]
    /// - `MessageTooShort` if `bytes` cannot hold a version byte and signature
    /// - `LegacyVersion` if the message predates [`CURRENT_VERSION`]
    /// - `UnsupportedVersion` if the message is from a newer version
    /// - `CborDecode` if the body is malformed
    ///
    /// # Security
    ///
    /// Validation runs cheapest-first (size, version) so garbage input is
    /// rejected before the CBOR decoder sees it.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge { size: bytes.len(), max: MAX_MESSAGE_SIZE });
        }

        if bytes.len() < MIN_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooShort {
                expected: MIN_MESSAGE_SIZE,
                actual: bytes.len(),
            });
        }

        let version = bytes[0] >> 4;
        if version < CURRENT_VERSION {
            return Err(ProtocolError::LegacyVersion(version));
        }
        if version > CURRENT_VERSION {
            return Err(ProtocolError::UnsupportedVersion(version));
        }

        let body_bytes = &bytes[1..bytes.len() - SIGNATURE_SIZE];
        let body: MessageBody = ciborium::de::from_reader(body_bytes)
            .map_err(|e| ProtocolError::CborDecode(e.to_string()))?;

        Ok(Self {
            version,
            key_id: body.key_id,
            iteration: body.iteration,
            ciphertext: body.ciphertext,
            serialized: bytes.to_vec(),
        })
    }

    /// Message version (high nibble of the version byte).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Sender key state this message was encrypted under.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Chain iteration of the message key.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// AES-256-CBC ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Bytes covered by the signature (everything except the signature).
    pub fn signed_bytes(&self) -> &[u8] {
        &self.serialized[..self.serialized.len() - SIGNATURE_SIZE]
    }

    /// Trailing signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.serialized[self.serialized.len() - SIGNATURE_SIZE..]
    }

    /// Full serialized message.
    pub fn serialized(&self) -> &[u8] {
        &self.serialized
    }

    /// Consume the message, returning its serialized form.
    pub fn into_bytes(self) -> Vec<u8> {
        self.serialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_sign(data: &[u8]) -> [u8; SIGNATURE_SIZE] {
        let mut signature = [0u8; SIGNATURE_SIZE];
        signature[0] = data.len() as u8;
        signature[63] = 0xEE;
        signature
    }

    #[test]
    fn new_then_decode_preserves_fields() {
        let message = SenderKeyMessage::new(7, 42, vec![1, 2, 3], fake_sign).unwrap();
        let decoded = SenderKeyMessage::decode(message.serialized()).unwrap();

        assert_eq!(decoded.version(), CURRENT_VERSION);
        assert_eq!(decoded.key_id(), 7);
        assert_eq!(decoded.iteration(), 42);
        assert_eq!(decoded.ciphertext(), &[1, 2, 3]);
        assert_eq!(decoded, message);
    }

    #[test]
    fn version_byte_layout() {
        assert_eq!(version_byte(), 0x33);

        let message = SenderKeyMessage::new(1, 0, vec![], fake_sign).unwrap();
        assert_eq!(message.serialized()[0], 0x33);
    }

    #[test]
    fn signature_covers_prefix() {
        let message = SenderKeyMessage::new(1, 2, vec![9; 16], fake_sign).unwrap();

        let signed_len = message.signed_bytes().len();
        assert_eq!(signed_len + SIGNATURE_SIZE, message.serialized().len());
        assert_eq!(message.signature()[0], signed_len as u8);
        assert_eq!(message.signature()[63], 0xEE);
    }

    #[test]
    fn decode_rejects_short_input() {
        let result = SenderKeyMessage::decode(&[0x33; 10]);
        assert_eq!(result, Err(ProtocolError::MessageTooShort { expected: 65, actual: 10 }));
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert!(matches!(
            SenderKeyMessage::decode(&[]),
            Err(ProtocolError::MessageTooShort { actual: 0, .. })
        ));
    }

    #[test]
    fn decode_reports_legacy_version() {
        let mut bytes = SenderKeyMessage::new(1, 2, vec![0; 16], fake_sign).unwrap().into_bytes();
        bytes[0] = 0x22;

        assert_eq!(SenderKeyMessage::decode(&bytes), Err(ProtocolError::LegacyVersion(2)));
    }

    #[test]
    fn decode_rejects_future_version() {
        let mut bytes = SenderKeyMessage::new(1, 2, vec![0; 16], fake_sign).unwrap().into_bytes();
        bytes[0] = 0x43;

        assert_eq!(SenderKeyMessage::decode(&bytes), Err(ProtocolError::UnsupportedVersion(4)));
    }

    #[test]
    fn decode_rejects_garbage_body() {
        let mut bytes = vec![version_byte(), 0xFF, 0xFF];
        bytes.extend_from_slice(&[0u8; SIGNATURE_SIZE]);

        assert!(matches!(SenderKeyMessage::decode(&bytes), Err(ProtocolError::CborDecode(_))));
    }

    #[test]
    fn decode_rejects_oversized_input() {
        let bytes = vec![version_byte(); MAX_MESSAGE_SIZE + 1];
        assert!(matches!(
            SenderKeyMessage::decode(&bytes),
            Err(ProtocolError::MessageTooLarge { .. })
        ));
    }

    #[test]
    fn decode_keeps_received_bytes() {
        let message = SenderKeyMessage::new(3, 4, vec![5; 32], fake_sign).unwrap();
        let bytes = message.serialized().to_vec();

        let decoded = SenderKeyMessage::decode(&bytes).unwrap();
        assert_eq!(decoded.serialized(), &bytes[..]);
        assert_eq!(decoded.signed_bytes(), message.signed_bytes());
    }
}
