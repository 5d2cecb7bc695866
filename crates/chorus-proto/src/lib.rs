//! Chorus wire protocol
//!
//! Serialization of the sender key message envelope exchanged between group
//! members. The envelope is a one-byte version tag, a CBOR body carrying the
//! key id, chain iteration and ciphertext, and a trailing Ed25519 signature
//! over everything before it.
//!
//! This crate holds no key material: signing is supplied by the caller, and
//! verification is the caller's job using [`SenderKeyMessage::signed_bytes`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod errors;
mod message;

pub use errors::{ProtocolError, Result};
pub use message::{
    CURRENT_VERSION, MAX_MESSAGE_SIZE, SIGNATURE_SIZE, SenderKeyMessage, version_byte,
};
