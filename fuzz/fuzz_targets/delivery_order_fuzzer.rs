//! Fuzz target for ratchet delivery order
//!
//! Drives a sender and receiver with an arbitrary interleaving of sends,
//! deliveries and replays.
//!
//! # Invariants
//!
//! - Every first delivery decrypts to the original plaintext
//! - Every second delivery is rejected as a duplicate
//! - The receiver chain never moves backwards

#![no_main]

use arbitrary::Arbitrary;
use chorus_client::{
    GroupCipher, GroupCipherConfig, GroupCipherError, MemorySenderKeyStore, SenderKeyName,
    SenderKeyRecord, SenderKeyState, SenderKeyStore, SessionLocks,
};
use chorus_crypto::Entropy;
use libfuzzer_sys::fuzz_target;

#[derive(Clone)]
struct FixedEntropy;

impl Entropy for FixedEntropy {
    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(0x5C);
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Send(u8),
    Deliver(u8),
}

fuzz_target!(|ops: Vec<Op>| {
    let name = SenderKeyName::new("fuzz", "alice", 1);
    let state = SenderKeyState::generate(1, &FixedEntropy);
    let locks = SessionLocks::new();
    let config = GroupCipherConfig { max_future_skip: 64, max_message_keys: 64 };

    let sender_store = MemorySenderKeyStore::new();
    let receiver_store = MemorySenderKeyStore::new();
    for (store, state) in [(&sender_store, state.clone()), (&receiver_store, state.verifying_copy())]
    {
        let mut record = SenderKeyRecord::new();
        record.add_sender_key_state(state);
        let Ok(()) = store.store_sender_key(&name, &record) else { return };
    }

    let sender = GroupCipher::with_config(sender_store, name.clone(), config, locks.clone());
    let receiver = GroupCipher::with_config(receiver_store.clone(), name.clone(), config, locks);

    // (envelope, plaintext, delivered)
    let mut sent: Vec<(Vec<u8>, Vec<u8>, bool)> = Vec::new();
    let mut chain_iteration = 0;

    for op in ops.into_iter().take(256) {
        match op {
            Op::Send(tag) => {
                if sent.len() >= 64 {
                    continue;
                }
                let plaintext = vec![tag; usize::from(tag % 40)];
                let Ok(envelope) = sender.encrypt(&plaintext) else { return };
                sent.push((envelope, plaintext, false));
            },
            Op::Deliver(index) => {
                if sent.is_empty() {
                    continue;
                }
                let (envelope, plaintext, delivered) = &mut sent[usize::from(index) % sent.len()];
                match receiver.decrypt(envelope) {
                    Ok(decrypted) => {
                        assert!(!*delivered, "replay decrypted");
                        assert_eq!(&decrypted, plaintext);
                        *delivered = true;
                    },
                    Err(GroupCipherError::DuplicateMessage { .. }) => {
                        assert!(*delivered, "first delivery rejected as duplicate");
                    },
                    Err(e) => panic!("unexpected error: {e}"),
                }

                let Ok(Some(record)) = receiver_store.load_sender_key(&name) else { return };
                let Some(state) = record.sender_key_state() else { return };
                assert!(state.chain_key().iteration() >= chain_iteration);
                chain_iteration = state.chain_key().iteration();
            },
        }
    }
});
