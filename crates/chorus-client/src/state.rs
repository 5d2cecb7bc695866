//! Per-sender ratchet state.
//!
//! A [`SenderKeyState`] is everything needed to encrypt as, or decrypt from,
//! one sender under one key id: the current chain key, the signing keypair
//! and a bounded cache of message keys skipped by out-of-order delivery.
//!
//! # Invariants
//!
//! - Every cached message key has an iteration below the chain key's
//!   iteration. Keys at or above it are derived on demand.
//! - The cache holds at most the configured capacity; insertion order is
//!   kept so the oldest key is evicted first.
//! - Only the locally-owned sending state carries a signing private key.

use std::{collections::VecDeque, fmt};

use chorus_crypto::{Entropy, SenderChainKey, SenderMessageKey};
use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Ratchet state for one sender key id.
#[derive(Clone, Serialize, Deserialize)]
pub struct SenderKeyState {
    key_id: u32,
    chain_key: SenderChainKey,
    signing_public: VerifyingKey,
    signing_private: Option<SigningKey>,
    /// Skipped message keys, oldest first
    message_keys: VecDeque<SenderMessageKey>,
}

impl SenderKeyState {
    /// Build a state from distributed key material.
    ///
    /// Receivers pass `None` for `signing_private`.
    pub fn new(
        key_id: u32,
        chain_key: SenderChainKey,
        signing_public: VerifyingKey,
        signing_private: Option<SigningKey>,
    ) -> Self {
        Self { key_id, chain_key, signing_public, signing_private, message_keys: VecDeque::new() }
    }

    /// Create a fresh locally-owned sending state.
    ///
    /// The chain starts at iteration 0 with a random seed and a newly
    /// generated Ed25519 keypair.
    pub fn generate(key_id: u32, entropy: &impl Entropy) -> Self {
        let seed = entropy.random_array();
        let mut secret = entropy.random_array();
        let signing_key = SigningKey::from_bytes(&secret);
        secret.zeroize();

        Self::new(
            key_id,
            SenderChainKey::new(0, seed),
            signing_key.verifying_key(),
            Some(signing_key),
        )
    }

    /// Random key id in the non-negative 31-bit range.
    pub fn generate_key_id(entropy: &impl Entropy) -> u32 {
        entropy.random_u32() & 0x7FFF_FFFF
    }

    /// The view of this state handed to other group members.
    ///
    /// Same key id and current chain key, public signing key only, and an
    /// empty skipped-key cache.
    pub fn verifying_copy(&self) -> Self {
        Self::new(self.key_id, self.chain_key.clone(), self.signing_public, None)
    }

    /// Key id selecting this state within a record.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Current chain key.
    pub fn chain_key(&self) -> &SenderChainKey {
        &self.chain_key
    }

    /// Replace the chain key with an advanced one.
    ///
    /// The previous chain key is dropped (and zeroized).
    pub fn set_chain_key(&mut self, chain_key: SenderChainKey) {
        debug_assert!(chain_key.iteration() >= self.chain_key.iteration());
        self.chain_key = chain_key;
    }

    /// Public key that verifies this sender's messages.
    pub fn signing_public(&self) -> &VerifyingKey {
        &self.signing_public
    }

    /// Private key, present only on the sender's own state.
    pub fn signing_private(&self) -> Option<&SigningKey> {
        self.signing_private.as_ref()
    }

    /// Check whether a skipped key for `iteration` is cached.
    pub fn has_message_key(&self, iteration: u32) -> bool {
        self.message_keys.iter().any(|key| key.iteration() == iteration)
    }

    /// Cache a skipped message key, evicting the oldest keys beyond
    /// `capacity`.
    ///
    /// With `capacity == 0` nothing is cached.
    pub fn add_message_key(&mut self, message_key: SenderMessageKey, capacity: usize) {
        if capacity == 0 {
            return;
        }

        debug_assert!(!self.has_message_key(message_key.iteration()));

        while self.message_keys.len() >= capacity {
            if let Some(evicted) = self.message_keys.pop_front() {
                tracing::trace!(
                    key_id = self.key_id,
                    iteration = evicted.iteration(),
                    "Evicted skipped message key"
                );
            }
        }

        self.message_keys.push_back(message_key);
    }

    /// Remove and return the cached key for `iteration`.
    ///
    /// Removal consumes the key, so a second message at the same iteration
    /// is rejected.
    pub fn remove_message_key(&mut self, iteration: u32) -> Option<SenderMessageKey> {
        let index = self.message_keys.iter().position(|key| key.iteration() == iteration)?;
        self.message_keys.remove(index)
    }

    /// Number of cached skipped keys.
    pub fn message_key_count(&self) -> usize {
        self.message_keys.len()
    }
}

impl fmt::Debug for SenderKeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderKeyState")
            .field("key_id", &self.key_id)
            .field("iteration", &self.chain_key.iteration())
            .field("can_sign", &self.signing_private.is_some())
            .field("skipped_keys", &self.message_keys.len())
            .finish_non_exhaustive()
    }
}
