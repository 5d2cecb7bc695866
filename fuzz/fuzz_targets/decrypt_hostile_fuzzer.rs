//! Fuzz target for decrypting hostile envelopes
//!
//! A receiver with a real session is fed arbitrary bytes and mutations of a
//! genuine envelope.
//!
//! # Invariants
//!
//! - NEVER panic
//! - Nothing but the genuine envelope decrypts
//! - A rejected envelope never changes the stored record

#![no_main]

use arbitrary::Arbitrary;
use chorus_client::{
    GroupCipher, GroupCipherConfig, MemorySenderKeyStore, SenderKeyName, SenderKeyRecord,
    SenderKeyState, SenderKeyStore, SessionLocks,
};
use chorus_crypto::Entropy;
use libfuzzer_sys::fuzz_target;

#[derive(Clone)]
struct FixedEntropy;

impl Entropy for FixedEntropy {
    fn random_bytes(&self, buffer: &mut [u8]) {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(31);
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Input {
    Raw(Vec<u8>),
    Mutate { edits: Vec<(u16, u8)>, truncate: Option<u16> },
}

fuzz_target!(|input: Input| {
    let name = SenderKeyName::new("fuzz", "alice", 1);
    let state = SenderKeyState::generate(7, &FixedEntropy);
    let locks = SessionLocks::new();

    let sender_store = MemorySenderKeyStore::new();
    let receiver_store = MemorySenderKeyStore::new();
    for (store, state) in [(&sender_store, state.clone()), (&receiver_store, state.verifying_copy())]
    {
        let mut record = SenderKeyRecord::new();
        record.add_sender_key_state(state);
        let Ok(()) = store.store_sender_key(&name, &record) else { return };
    }

    let config = GroupCipherConfig::default();
    let sender = GroupCipher::with_config(sender_store, name.clone(), config, locks.clone());
    let receiver = GroupCipher::with_config(receiver_store.clone(), name.clone(), config, locks);

    let Ok(genuine) = sender.encrypt(b"fuzz payload") else { return };

    let bytes = match input {
        Input::Raw(bytes) => bytes,
        Input::Mutate { edits, truncate } => {
            let mut bytes = genuine.clone();
            for (index, xor) in edits {
                if let Some(byte) = bytes.get_mut(usize::from(index) % genuine.len()) {
                    *byte ^= xor;
                }
            }
            if let Some(len) = truncate {
                bytes.truncate(usize::from(len));
            }
            bytes
        },
    };

    let Ok(before) = receiver_store.raw_record(&name) else { return };
    match receiver.decrypt(&bytes) {
        Ok(plaintext) => {
            assert_eq!(bytes, genuine, "only the genuine envelope may decrypt");
            assert_eq!(plaintext, b"fuzz payload");
        },
        Err(_) => {
            let Ok(after) = receiver_store.raw_record(&name) else { return };
            assert_eq!(before, after, "rejected envelope changed state");
        },
    }
});
