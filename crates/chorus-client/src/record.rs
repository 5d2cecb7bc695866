//! Persisted sender key record.
//!
//! A record is the unit round-tripped through the store: every state known
//! for one sender identity, newest first. Rekeying adds a new state; older
//! ones stay so in-flight messages under the previous key id still decrypt.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{state::SenderKeyState, store::StoreError};

/// Maximum states kept per record. Older states are dropped on insert.
pub const MAX_STATES: usize = 5;

/// All sender key states for one identity, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderKeyRecord {
    states: VecDeque<SenderKeyState>,
}

impl SenderKeyRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the record holds no state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of states held.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// States, newest first.
    pub fn states(&self) -> impl Iterator<Item = &SenderKeyState> {
        self.states.iter()
    }

    /// Newest state, used for sending.
    pub fn sender_key_state(&self) -> Option<&SenderKeyState> {
        self.states.front()
    }

    /// Mutable newest state.
    pub fn sender_key_state_mut(&mut self) -> Option<&mut SenderKeyState> {
        self.states.front_mut()
    }

    /// State for a specific key id.
    pub fn sender_key_state_by_id(&self, key_id: u32) -> Option<&SenderKeyState> {
        self.states.iter().find(|state| state.key_id() == key_id)
    }

    /// Mutable state for a specific key id.
    pub fn sender_key_state_by_id_mut(&mut self, key_id: u32) -> Option<&mut SenderKeyState> {
        self.states.iter_mut().find(|state| state.key_id() == key_id)
    }

    /// Insert a state as the newest.
    ///
    /// A state with the same key id is replaced. States beyond
    /// [`MAX_STATES`] are dropped oldest first.
    pub fn add_sender_key_state(&mut self, state: SenderKeyState) {
        self.states.retain(|existing| existing.key_id() != state.key_id());
        self.states.push_front(state);
        self.states.truncate(MAX_STATES);
    }

    /// Replace every state with `state`.
    pub fn set_sender_key_state(&mut self, state: SenderKeyState) {
        self.states.clear();
        self.states.push_back(state);
    }

    /// Serialize to the CBOR persistence form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(self, &mut bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Deserialize from the CBOR persistence form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let record: Self = ciborium::de::from_reader(bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if record.states.len() > MAX_STATES {
            return Err(StoreError::Serialization(format!(
                "record holds {} states, maximum is {MAX_STATES}",
                record.states.len()
            )));
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chorus_crypto::SenderChainKey;
    use ed25519_dalek::SigningKey;

    use super::*;

    fn state(key_id: u32) -> SenderKeyState {
        let signing_key = SigningKey::from_bytes(&[key_id as u8; 32]);
        SenderKeyState::new(
            key_id,
            SenderChainKey::new(0, [key_id as u8; 32]),
            signing_key.verifying_key(),
            Some(signing_key),
        )
    }

    #[test]
    fn newest_state_is_sending_state() {
        let mut record = SenderKeyRecord::new();
        record.add_sender_key_state(state(1));
        record.add_sender_key_state(state(2));

        assert_eq!(record.sender_key_state().map(SenderKeyState::key_id), Some(2));
        assert_eq!(record.sender_key_state_by_id(1).map(SenderKeyState::key_id), Some(1));
        assert!(record.sender_key_state_by_id(3).is_none());
    }

    #[test]
    fn record_is_bounded() {
        let mut record = SenderKeyRecord::new();
        for key_id in 0..8 {
            record.add_sender_key_state(state(key_id));
        }

        assert_eq!(record.len(), MAX_STATES);
        assert!(record.sender_key_state_by_id(2).is_none());
        assert!(record.sender_key_state_by_id(3).is_some());
    }

    #[test]
    fn same_key_id_replaces_existing() {
        let mut record = SenderKeyRecord::new();
        record.add_sender_key_state(state(1));
        record.add_sender_key_state(state(2));
        record.add_sender_key_state(state(1).verifying_copy());

        assert_eq!(record.len(), 2);
        let newest = record.sender_key_state().unwrap();
        assert_eq!(newest.key_id(), 1);
        assert!(newest.signing_private().is_none());
    }

    #[test]
    fn set_replaces_all_states() {
        let mut record = SenderKeyRecord::new();
        record.add_sender_key_state(state(1));
        record.add_sender_key_state(state(2));
        record.set_sender_key_state(state(3));

        assert_eq!(record.len(), 1);
        assert_eq!(record.sender_key_state().map(SenderKeyState::key_id), Some(3));
    }

    #[test]
    fn bytes_roundtrip_preserves_chain() {
        let mut sending = state(7);
        sending.set_chain_key(sending.chain_key().next().unwrap());
        sending.add_message_key(SenderChainKey::new(0, [1; 32]).message_key(), 10);

        let mut record = SenderKeyRecord::new();
        record.add_sender_key_state(sending);

        let restored = SenderKeyRecord::from_bytes(&record.to_bytes().unwrap()).unwrap();
        let original = record.sender_key_state().unwrap();
        let loaded = restored.sender_key_state().unwrap();

        assert_eq!(loaded.key_id(), 7);
        assert_eq!(loaded.chain_key().iteration(), 1);
        assert_eq!(loaded.chain_key().seed(), original.chain_key().seed());
        assert_eq!(loaded.signing_public(), original.signing_public());
        assert!(loaded.signing_private().is_some());
        assert!(loaded.has_message_key(0));
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        assert!(matches!(
            SenderKeyRecord::from_bytes(&[0xFF, 0x00, 0x13]),
            Err(StoreError::Serialization(_))
        ));
    }
}
