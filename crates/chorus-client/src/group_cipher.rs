//! Sender key group cipher.
//!
//! Encrypts and decrypts messages for one (group, sender, device) identity.
//!
//! # Encrypt
//!
//! ```text
//! load record ─► newest state ─► message key[n] ─► AES-256-CBC ─► sign ─► chain[n+1] ─► store
//! ```
//!
//! # Decrypt
//!
//! ```text
//! decode ─► load record ─► state[key_id] ─► verify ─► resolve key[i] ─► AES-256-CBC ─► store
//! ```
//!
//! Key resolution against a chain at iteration `c`:
//!
//! - `i < c`: take the cached skipped key, or reject as a duplicate
//! - `i - c > max_future_skip`: reject without deriving anything
//! - otherwise cache keys `c..i`, return key `i`, advance the chain to `i + 1`
//!
//! # Security
//!
//! - The signature is checked before any chain work, so forged messages
//!   cannot advance the ratchet or fill the cache.
//! - Each message key is used once. Cached keys are removed when consumed,
//!   which is what rejects replays of old iterations.
//! - State is stored only after the whole operation succeeded.

use std::sync::PoisonError;

use chorus_crypto::{SenderMessageKey, decrypt_message, encrypt_message, sign, verify};
use chorus_proto::SenderKeyMessage;

use crate::{
    config::GroupCipherConfig, error::GroupCipherError, locks::SessionLocks,
    name::SenderKeyName, state::SenderKeyState, store::SenderKeyStore,
};

/// Encrypts and decrypts sender key messages for one identity.
///
/// Cheap to construct; all state lives in the store. Any number of ciphers
/// may exist for the same identity as long as they share a
/// [`SessionLocks`] registry (the global one by default).
#[derive(Debug, Clone)]
pub struct GroupCipher<S: SenderKeyStore> {
    store: S,
    name: SenderKeyName,
    config: GroupCipherConfig,
    locks: SessionLocks,
}

impl<S: SenderKeyStore> GroupCipher<S> {
    /// Cipher with default limits and the process-wide lock registry.
    pub fn new(store: S, name: SenderKeyName) -> Self {
        Self::with_config(store, name, GroupCipherConfig::default(), SessionLocks::global())
    }

    /// Cipher with explicit limits and lock registry.
    pub fn with_config(
        store: S,
        name: SenderKeyName,
        config: GroupCipherConfig,
        locks: SessionLocks,
    ) -> Self {
        Self { store, name, config, locks }
    }

    /// Identity this cipher operates on.
    pub fn name(&self) -> &SenderKeyName {
        &self.name
    }

    /// Limits applied when decrypting.
    pub fn config(&self) -> &GroupCipherConfig {
        &self.config
    }

    /// Encrypt `plaintext` under the newest sending state.
    ///
    /// Returns the serialized, signed envelope.
    ///
    /// # Errors
    ///
    /// - `NoSession` if there is no record, the record is empty, or the newest
    ///   state cannot sign
    /// - `ChainExhausted` if the sending chain is at its last iteration
    /// - `Storage` if loading or storing failed; nothing was persisted
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, GroupCipherError> {
        let lock = self.locks.handle(&self.name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(mut record) = self.store.load_sender_key(&self.name)? else {
            return Err(GroupCipherError::NoSession);
        };
        let Some(state) = record.sender_key_state_mut() else {
            return Err(GroupCipherError::NoSession);
        };
        let Some(signing_key) = state.signing_private() else {
            return Err(GroupCipherError::NoSession);
        };

        let key_id = state.key_id();
        let chain_key = state.chain_key();
        let Ok(next_chain_key) = chain_key.next() else {
            return Err(GroupCipherError::ChainExhausted { key_id });
        };

        let message_key = chain_key.message_key();
        let ciphertext = encrypt_message(&message_key, plaintext);
        let message =
            SenderKeyMessage::new(key_id, message_key.iteration(), ciphertext, |signed| {
                sign(signing_key, signed)
            })?;

        state.set_chain_key(next_chain_key);
        self.store.store_sender_key(&self.name, &record)?;

        tracing::debug!(
            name = %self.name,
            key_id,
            iteration = message.iteration(),
            "Encrypted sender key message"
        );

        Ok(message.into_bytes())
    }

    /// Verify and decrypt a serialized envelope.
    ///
    /// # Errors
    ///
    /// - `LegacyMessage` if the envelope uses an older version
    /// - `InvalidMessage` if the envelope is malformed, names an unknown key
    ///   id, fails signature verification, jumps too far ahead, or does not
    ///   decrypt
    /// - `DuplicateMessage` if the iteration was already consumed or evicted
    /// - `Storage` if loading or storing failed; nothing was persisted
    pub fn decrypt(&self, serialized: &[u8]) -> Result<Vec<u8>, GroupCipherError> {
        let message = SenderKeyMessage::decode(serialized)?;

        let lock = self.locks.handle(&self.name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let key_id = message.key_id();
        let mut record = self.store.load_sender_key(&self.name)?.unwrap_or_default();
        let Some(state) = record.sender_key_state_by_id_mut(key_id) else {
            tracing::warn!(name = %self.name, key_id, "Unknown sender key id");
            return Err(GroupCipherError::invalid(format!("no sender key state for key id {key_id}")));
        };

        if let Err(e) = verify(state.signing_public(), message.signed_bytes(), message.signature()) {
            tracing::warn!(name = %self.name, key_id, error = %e, "Rejected sender key message");
            return Err(e.into());
        }

        let message_key = resolve_message_key(state, message.iteration(), &self.config)
            .inspect_err(|e| {
                tracing::warn!(
                    name = %self.name,
                    key_id,
                    iteration = message.iteration(),
                    error = %e,
                    "Could not resolve message key"
                );
            })?;

        let plaintext = decrypt_message(&message_key, message.ciphertext())?;
        self.store.store_sender_key(&self.name, &record)?;

        tracing::debug!(
            name = %self.name,
            key_id,
            iteration = message.iteration(),
            "Decrypted sender key message"
        );

        Ok(plaintext)
    }
}

/// Find the message key for `iteration`, advancing `state` as needed.
///
/// Mutates the chain key and skipped-key cache in place; the caller persists
/// `state` only if the whole decrypt succeeds.
fn resolve_message_key(
    state: &mut SenderKeyState,
    iteration: u32,
    config: &GroupCipherConfig,
) -> Result<SenderMessageKey, GroupCipherError> {
    let current = state.chain_key().iteration();

    if iteration < current {
        return state
            .remove_message_key(iteration)
            .ok_or(GroupCipherError::DuplicateMessage { current, received: iteration });
    }

    if iteration - current > config.max_future_skip {
        return Err(GroupCipherError::invalid(format!(
            "iteration {iteration} is more than {} ahead of chain at {current}",
            config.max_future_skip
        )));
    }

    let mut chain_key = state.chain_key().clone();
    while chain_key.iteration() < iteration {
        state.add_message_key(chain_key.message_key(), config.max_message_keys);
        chain_key = chain_key.next()?;
    }

    if iteration > current {
        tracing::debug!(
            key_id = state.key_id(),
            skipped = iteration - current,
            cached = state.message_key_count(),
            "Cached skipped message keys"
        );
    }

    let message_key = chain_key.message_key();
    state.set_chain_key(chain_key.next()?);

    Ok(message_key)
}
