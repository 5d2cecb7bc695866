//! Chorus Cryptographic Primitives
//!
//! Cryptographic building blocks for Chorus sender key sessions. Pure
//! functions with deterministic outputs. Callers provide random bytes (through
//! [`Entropy`]) for deterministic testing.
//!
//! # Key Lifecycle
//!
//! Each group member owns one sender chain per group. The chain seed and the
//! signing keypair are distributed once to every member; after that a
//! symmetric ratchet produces one-time message keys without further key
//! agreement.
//!
//! ```text
//! Chain Key[n] ──HMAC(0x02)──► Chain Key[n+1] ──► ...
//!      │
//!      └──HMAC(0x01)──► Message Seed[n]
//!                            │
//!                            ▼ HKDF-SHA256
//!                       (IV, Cipher Key)[n]
//!                            │
//!                            ▼
//!                    AES-256-CBC Ciphertext ──► Ed25519 signature
//! ```
//!
//! Message keys are used for exactly one encryption or decryption and are
//! discarded after use, so past messages remain secure even if later chain
//! keys are compromised.
//!
//! # Security
//!
//! Forward Secrecy:
//! - Chain advancement is one-way; old chain keys are zeroized on drop
//! - Message keys are zeroized on drop after their single use
//!
//! Authenticity:
//! - Every message is signed with the sender's Ed25519 key
//! - CBC padding errors are reported only after signature verification has
//!   already passed, so they are never an oracle for forged input

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod sender_keys;

pub use env::{Entropy, SystemEntropy};
pub use sender_keys::{
    CryptoError, SIGNATURE_LENGTH, SenderChainKey, SenderMessageKey, decrypt_message,
    derive_message_key_material, encrypt_message, sign, verify,
};
