//! Message key material derivation using HKDF

use hkdf::Hkdf;
use sha2::Sha256;

/// Label used for message key expansion
const MESSAGE_KEY_INFO: &[u8] = b"chorusSenderMessageV1";

/// IV (16) followed by AES-256 key (32)
const DERIVED_MATERIAL_SIZE: usize = 48;

/// Split a message key seed into a CBC IV and an AES-256 cipher key.
///
/// The seed is the HMAC output of a chain key under the message label. HKDF
/// expands it to 48 bytes: the first 16 form the IV, the remaining 32 the
/// cipher key.
///
/// # Security
///
/// - Deterministic: the same seed always yields the same (IV, key) pair, so
///   sender and receiver derive identical material independently
/// - IV and key come from disjoint output ranges
pub fn derive_message_key_material(seed: &[u8; 32]) -> ([u8; 16], [u8; 32]) {
    let hkdf = Hkdf::<Sha256>::new(None, seed);

    let mut material = [0u8; DERIVED_MATERIAL_SIZE];
    let Ok(()) = hkdf.expand(MESSAGE_KEY_INFO, &mut material) else {
        unreachable!("48 bytes is a valid HKDF-SHA256 output length");
    };

    let mut iv = [0u8; 16];
    let mut cipher_key = [0u8; 32];
    iv.copy_from_slice(&material[..16]);
    cipher_key.copy_from_slice(&material[16..]);

    zeroize::Zeroize::zeroize(&mut material);
    (iv, cipher_key)
}
