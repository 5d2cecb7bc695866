//! Sender chain ratchet for forward-secure message key derivation
//!
//! # Security Properties
//!
//! - Forward Secrecy: `next()` is a one-way function of the current seed
//! - Key Uniqueness: each iteration produces a unique message key
//! - Determinism: the same seed always produces the same key sequence
//!
//! Both [`SenderChainKey::next`] and [`SenderChainKey::message_key`] are pure:
//! they return new values and never mutate the chain key they are called on.
//! Owners replace their chain key wholesale when advancing.

use std::fmt;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use super::{derivation::derive_message_key_material, error::CryptoError};

type HmacSha256 = Hmac<Sha256>;

/// Label for deriving a message key seed
const MESSAGE_KEY_LABEL: &[u8] = &[0x01];

/// Label for deriving the next chain key
const CHAIN_KEY_LABEL: &[u8] = &[0x02];

/// A message key derived from the sender chain.
///
/// Used for a single message encryption/decryption, then dropped.
#[derive(Clone, Serialize, Deserialize)]
pub struct SenderMessageKey {
    /// The chain iteration this key was derived from
    iteration: u32,
    /// 16-byte CBC initialization vector
    iv: [u8; 16],
    /// 32-byte AES-256 key
    cipher_key: [u8; 32],
}

impl SenderMessageKey {
    /// Build a message key from its parts.
    pub fn new(iteration: u32, iv: [u8; 16], cipher_key: [u8; 32]) -> Self {
        Self { iteration, iv, cipher_key }
    }

    /// Chain iteration this key was derived from.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// 16-byte CBC initialization vector.
    pub fn iv(&self) -> &[u8; 16] {
        &self.iv
    }

    /// 32-byte AES-256 key.
    pub fn cipher_key(&self) -> &[u8; 32] {
        &self.cipher_key
    }
}

impl fmt::Debug for SenderMessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderMessageKey").field("iteration", &self.iteration).finish_non_exhaustive()
    }
}

impl Drop for SenderMessageKey {
    fn drop(&mut self) {
        self.iv.zeroize();
        self.cipher_key.zeroize();
    }
}

/// Forward-secure sender chain key.
///
/// Holds the current chain secret and its iteration. Message keys and the
/// next chain key are both HMAC-SHA256 derivations of the secret under
/// distinct one-byte labels.
#[derive(Clone, Serialize, Deserialize)]
pub struct SenderChainKey {
    /// Position of this key in the chain
    iteration: u32,
    /// Current chain secret (32 bytes)
    seed: [u8; 32],
}

impl SenderChainKey {
    /// Create a chain key at a given iteration.
    ///
    /// Freshly generated chains start at iteration 0.
    pub fn new(iteration: u32, seed: [u8; 32]) -> Self {
        Self { iteration, seed }
    }

    /// Position of this key in the chain.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Current chain secret.
    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    /// Derive the message key for this iteration.
    pub fn message_key(&self) -> SenderMessageKey {
        let mut message_seed = self.derive(MESSAGE_KEY_LABEL);
        let (iv, cipher_key) = derive_message_key_material(&message_seed);
        message_seed.zeroize();

        SenderMessageKey { iteration: self.iteration, iv, cipher_key }
    }

    /// Derive the chain key for the next iteration.
    ///
    /// # Errors
    ///
    /// - `IterationOverflow` if this key is already at `u32::MAX`. Wrapping
    ///   would reuse iteration numbers.
    pub fn next(&self) -> Result<Self, CryptoError> {
        let Some(iteration) = self.iteration.checked_add(1) else {
            return Err(CryptoError::IterationOverflow { current: self.iteration });
        };

        Ok(Self { iteration, seed: self.derive(CHAIN_KEY_LABEL) })
    }

    fn derive(&self, label: &[u8]) -> [u8; 32] {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.seed) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(label);
        mac.finalize().into_bytes().into()
    }
}

impl fmt::Debug for SenderChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderChainKey").field("iteration", &self.iteration).finish_non_exhaustive()
    }
}

impl Drop for SenderChainKey {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}
