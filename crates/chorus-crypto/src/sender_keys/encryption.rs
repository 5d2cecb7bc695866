//! Message encryption using AES-256-CBC with PKCS#7 padding
//!
//! The IV and key both come from the message key, so every ciphertext is
//! bound to exactly one chain iteration. Output buffers are sized to the
//! processed length; nothing is over-allocated.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};

use super::{error::CryptoError, ratchet::SenderMessageKey};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Encrypt a message with the given message key.
///
/// Returns the padded ciphertext. The ciphertext is always a non-empty
/// multiple of [`BLOCK_SIZE`] (PKCS#7 adds a full block to aligned input).
///
/// # Security
///
/// - The caller must not reuse `message_key` for a second plaintext
/// - Encryption cannot fail with fixed-size key and IV; a failure here would
///   be a broken invariant, not bad input
pub fn encrypt_message(message_key: &SenderMessageKey, plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes256CbcEnc::new(message_key.cipher_key().into(), message_key.iv().into());
    cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt a message with the given message key.
///
/// Returns the unpadded plaintext.
///
/// # Errors
///
/// - `DecryptionFailed`: empty input, input not a multiple of the block
///   size, or invalid padding (wrong key or corrupt ciphertext)
pub fn decrypt_message(
    message_key: &SenderMessageKey,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::DecryptionFailed {
            reason: format!("ciphertext length {} is not a positive block multiple", ciphertext.len()),
        });
    }

    let cipher = Aes256CbcDec::new(message_key.cipher_key().into(), message_key.iv().into());
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed { reason: "invalid padding".to_string() })
}

#[cfg(test)]
mod tests {
    use super::{super::ratchet::SenderChainKey, *};

    fn test_message_key(iteration: u32) -> SenderMessageKey {
        let mut seed = [0u8; 32];
        for (i, byte) in seed.iter_mut().enumerate() {
            *byte = (i + iteration as usize) as u8;
        }
        SenderChainKey::new(iteration, seed).message_key()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let message_key = test_message_key(0);
        let plaintext = b"Hello, World!";

        let ciphertext = encrypt_message(&message_key, plaintext);
        let decrypted = decrypt_message(&message_key, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn encrypt_decrypt_empty_message() {
        let message_key = test_message_key(0);

        let ciphertext = encrypt_message(&message_key, b"");
        assert_eq!(ciphertext.len(), BLOCK_SIZE, "empty input pads to one full block");

        let decrypted = decrypt_message(&message_key, &ciphertext).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn encrypt_decrypt_large_message() {
        let message_key = test_message_key(3);
        let plaintext = vec![0x42u8; 64 * 1024]; // 64KB

        let ciphertext = encrypt_message(&message_key, &plaintext);
        let decrypted = decrypt_message(&message_key, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn ciphertext_length_is_exact_padded_length() {
        let message_key = test_message_key(0);

        for len in [1usize, 15, 16, 17, 31, 32, 100] {
            let plaintext = vec![0x11u8; len];
            let ciphertext = encrypt_message(&message_key, &plaintext);
            let expected = (len / BLOCK_SIZE + 1) * BLOCK_SIZE;
            assert_eq!(ciphertext.len(), expected, "plaintext length {len}");
        }
    }

    #[test]
    fn wrong_key_fails_or_alters_output() {
        let message_key = test_message_key(0);
        let wrong_key = test_message_key(1);
        let plaintext = b"secret message";

        let ciphertext = encrypt_message(&message_key, plaintext);

        // CBC has no authentication tag: a wrong key almost always breaks the
        // padding, and never reproduces the plaintext.
        match decrypt_message(&wrong_key, &ciphertext) {
            Ok(decrypted) => assert_ne!(decrypted, plaintext),
            Err(CryptoError::DecryptionFailed { .. }) => {},
            Err(other) => unreachable!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truncated_ciphertext_fails_decryption() {
        let message_key = test_message_key(0);
        let ciphertext = encrypt_message(&message_key, b"original message");

        let result = decrypt_message(&message_key, &ciphertext[..ciphertext.len() - 1]);
        assert!(matches!(result, Err(CryptoError::DecryptionFailed { .. })));
    }

    #[test]
    fn empty_ciphertext_fails_decryption() {
        let message_key = test_message_key(0);

        let result = decrypt_message(&message_key, &[]);
        assert!(matches!(result, Err(CryptoError::DecryptionFailed { .. })));
    }

    #[test]
    fn same_key_and_plaintext_is_deterministic() {
        let message_key = test_message_key(9);

        let c1 = encrypt_message(&message_key, b"abc");
        let c2 = encrypt_message(&message_key, b"abc");

        assert_eq!(c1, c2);
    }
}
