//! Chorus Sender Key Client
//!
//! Stateful half of a sender key session. A [`GroupCipher`] encrypts and
//! decrypts messages for one (group, sender, device) identity, driving the
//! chain ratchet in [`chorus_crypto`] and the envelope in [`chorus_proto`].
//!
//! # Architecture
//!
//! ```text
//! GroupCipher ──lock(name)──► SessionLocks
//!      │
//!      ├──load/store──► SenderKeyStore ──► SenderKeyRecord ──► SenderKeyState[]
//!      │
//!      └──resolve key──► SenderKeyState (chain key + skipped-key cache)
//! ```
//!
//! Every operation is a single load → mutate → store sequence held under the
//! identity's lock. State is persisted only when the whole operation
//! succeeded, so a failed or abandoned call leaves the store untouched.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod group_cipher;
pub mod locks;
pub mod name;
pub mod record;
pub mod state;
pub mod store;

pub use config::GroupCipherConfig;
pub use error::GroupCipherError;
pub use group_cipher::GroupCipher;
pub use locks::SessionLocks;
pub use name::SenderKeyName;
pub use record::{MAX_STATES, SenderKeyRecord};
pub use state::SenderKeyState;
pub use store::{ChaoticSenderKeyStore, MemorySenderKeyStore, SenderKeyStore, StoreError};
