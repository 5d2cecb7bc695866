//! Sender Keys: per-sender symmetric ratchet for group messaging
//!
//! One sender chain per (group, sender) replaces pairwise key agreement for
//! every message after the initial distribution. This module holds the pure
//! building blocks; the stateful orchestration (record storage, skipped-key
//! cache, locking) lives in `chorus-client`.
//!
//! # Architecture
//!
//! ```text
//! SenderChainKey[iteration]
//!        │
//!        ├─► next() ──► SenderChainKey[iteration + 1]
//!        │
//!        ▼ message_key()
//! SenderMessageKey[iteration] = HKDF(HMAC(chain, 0x01)) → (IV, cipher key)
//!        │
//!        ▼ encrypt_message()
//! AES-256-CBC / PKCS#7 ciphertext
//!        │
//!        ▼ sign()
//! Ed25519 signature over the serialized envelope
//! ```
//!
//! # Security Properties
//!
//! - Forward Secrecy: chain derivation is one-way and secrets are zeroized on
//!   drop
//! - Key Uniqueness: each iteration yields a distinct message key
//! - Sender Authentication: signatures bind key id, iteration and ciphertext

pub mod derivation;
pub mod encryption;
pub mod error;
pub mod ratchet;
pub mod signing;

pub use derivation::derive_message_key_material;
pub use encryption::{decrypt_message, encrypt_message};
pub use error::CryptoError;
pub use ratchet::{SenderChainKey, SenderMessageKey};
pub use signing::{SIGNATURE_LENGTH, sign, verify};
