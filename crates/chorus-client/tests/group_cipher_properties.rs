//! Property-based tests for the group cipher
//!
//! 1. **Round-trip**: every plaintext survives encrypt then decrypt
//! 2. **Reordering**: any delivery order within the window decrypts every
//!    message exactly once
//! 3. **Replay**: a second delivery of any message is a duplicate

use chorus_client::{
    GroupCipher, GroupCipherConfig, GroupCipherError, MemorySenderKeyStore, SenderKeyName,
    SenderKeyRecord, SenderKeyState, SenderKeyStore, SessionLocks,
};
use chorus_crypto::Entropy;
use proptest::prelude::*;

#[derive(Clone)]
struct ByteEntropy(u8);

impl Entropy for ByteEntropy {
    fn random_bytes(&self, buffer: &mut [u8]) {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = self.0.wrapping_add(i as u8);
        }
    }
}

fn ciphers(
    seed: u8,
) -> (GroupCipher<MemorySenderKeyStore>, GroupCipher<MemorySenderKeyStore>) {
    let name = SenderKeyName::new("properties", "alice", u32::from(seed));
    let state = SenderKeyState::generate(u32::from(seed), &ByteEntropy(seed));
    let locks = SessionLocks::new();
    let config = GroupCipherConfig::default();

    let sender_store = MemorySenderKeyStore::new();
    let mut record = SenderKeyRecord::new();
    record.add_sender_key_state(state.clone());
    sender_store.store_sender_key(&name, &record).unwrap();

    let receiver_store = MemorySenderKeyStore::new();
    let mut record = SenderKeyRecord::new();
    record.add_sender_key_state(state.verifying_copy());
    receiver_store.store_sender_key(&name, &record).unwrap();

    (
        GroupCipher::with_config(sender_store, name.clone(), config, locks.clone()),
        GroupCipher::with_config(receiver_store, name, config, locks),
    )
}

fn delivery_order() -> impl Strategy<Value = Vec<usize>> {
    (1usize..24).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_roundtrip(
        seed in any::<u8>(),
        plaintexts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 1..8),
    ) {
        let (sender, receiver) = ciphers(seed);

        for plaintext in &plaintexts {
            let envelope = sender.encrypt(plaintext).unwrap();
            prop_assert_eq!(&receiver.decrypt(&envelope).unwrap(), plaintext);
        }
    }

    #[test]
    fn prop_any_order_decrypts_once(seed in any::<u8>(), order in delivery_order()) {
        let (sender, receiver) = ciphers(seed);
        let envelopes: Vec<Vec<u8>> = (0..order.len())
            .map(|i| sender.encrypt(&i.to_be_bytes()).unwrap())
            .collect();

        for &index in &order {
            let plaintext = receiver.decrypt(&envelopes[index]).unwrap();
            prop_assert_eq!(plaintext, index.to_be_bytes().to_vec());
        }

        for &index in &order {
            let replay = receiver.decrypt(&envelopes[index]);
            prop_assert!(
                matches!(replay, Err(GroupCipherError::DuplicateMessage { .. })),
                "replay of {} gave {:?}",
                index,
                replay
            );
        }
    }
}
