//! Ed25519 message signatures
//!
//! Every sender key message is signed with the sender's private key over all
//! envelope bytes preceding the signature. Receivers hold only the public
//! half.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use super::error::CryptoError;

/// Ed25519 signature size (64 bytes)
pub const SIGNATURE_LENGTH: usize = ed25519_dalek::SIGNATURE_LENGTH;

/// Sign `message` with the sender's private key.
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
    signing_key.sign(message).to_bytes()
}

/// Verify a signature produced by [`sign`].
///
/// Uses strict verification (rejects small-order keys and non-canonical
/// signatures).
///
/// # Errors
///
/// - `InvalidSignature` if the signature is not 64 bytes or does not verify
pub fn verify(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let signature = Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature {
        reason: format!("expected {SIGNATURE_LENGTH} bytes, got {}", signature.len()),
    })?;

    verifying_key
        .verify_strict(message, &signature)
        .map_err(|_| CryptoError::InvalidSignature { reason: "verification failed".to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(byte: u8) -> SigningKey {
        SigningKey::from_bytes(&[byte; 32])
    }

    #[test]
    fn sign_verify_roundtrip() {
        let key = test_key(1);
        let signature = sign(&key, b"message");

        assert!(verify(&key.verifying_key(), b"message", &signature).is_ok());
    }

    #[test]
    fn wrong_message_rejected() {
        let key = test_key(1);
        let signature = sign(&key, b"message");

        let result = verify(&key.verifying_key(), b"massage", &signature);
        assert!(matches!(result, Err(CryptoError::InvalidSignature { .. })));
    }

    #[test]
    fn wrong_key_rejected() {
        let signature = sign(&test_key(1), b"message");

        let result = verify(&test_key(2).verifying_key(), b"message", &signature);
        assert!(matches!(result, Err(CryptoError::InvalidSignature { .. })));
    }

    #[test]
    fn truncated_signature_rejected() {
        let key = test_key(1);
        let signature = sign(&key, b"message");

        let result = verify(&key.verifying_key(), b"message", &signature[..63]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidSignature { reason }) if reason.contains("63")
        ));
    }

    #[test]
    fn signatures_are_deterministic() {
        let key = test_key(5);
        assert_eq!(sign(&key, b"m"), sign(&key, b"m"));
    }
}
