//! Fuzz target for sender key envelope decoding
//!
//! # Strategy
//!
//! - Random bytes: arbitrary input straight into the decoder
//! - Valid tag, hostile body: correct version byte and signature length
//!   around attacker-chosen CBOR
//! - Huge lengths: CBOR headers claiming massive byte strings or arrays
//!
//! # Invariants
//!
//! - NEVER panic on malformed input
//! - Huge claimed lengths are rejected, not allocated
//! - A successful decode keeps the input bytes exactly

#![no_main]

use arbitrary::Arbitrary;
use chorus_proto::{SIGNATURE_SIZE, SenderKeyMessage, version_byte};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum EnvelopeAttack {
    RandomBytes { bytes: Vec<u8> },
    HostileBody { body: Vec<u8>, signature_fill: u8 },
    HugeLength { claimed_len_exponent: u8, array: bool },
}

fuzz_target!(|attack: EnvelopeAttack| {
    let bytes = match attack {
        EnvelopeAttack::RandomBytes { bytes } => bytes,
        EnvelopeAttack::HostileBody { body, signature_fill } => wrap(&body, signature_fill),
        EnvelopeAttack::HugeLength { claimed_len_exponent, array } => {
            let exponent = u32::from(claimed_len_exponent % 32);
            let claimed = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);

            // Map { "ciphertext": <huge> } with the other fields omitted
            let mut body = vec![0xA1, 0x6A];
            body.extend_from_slice(b"ciphertext");
            body.push(if array { 0x9A } else { 0x5A });
            body.extend_from_slice(&claimed.to_be_bytes());
            body.extend_from_slice(&[0x01; 8]);
            wrap(&body, 0)
        },
    };

    if let Ok(message) = SenderKeyMessage::decode(&bytes) {
        assert_eq!(message.serialized(), &bytes[..]);
        assert_eq!(message.signed_bytes().len() + SIGNATURE_SIZE, bytes.len());
    }
});

fn wrap(body: &[u8], signature_fill: u8) -> Vec<u8> {
    let mut bytes = vec![version_byte()];
    bytes.extend_from_slice(body);
    bytes.extend_from_slice(&[signature_fill; SIGNATURE_SIZE]);
    bytes
}
