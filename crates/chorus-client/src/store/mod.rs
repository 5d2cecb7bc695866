//! Sender key storage abstraction
//!
//! Durable keyed storage for [`SenderKeyRecord`]s. The trait is synchronous;
//! callers needing asynchrony wrap whole cipher operations, not store calls.

mod chaotic;
mod error;
mod memory;

pub use chaotic::ChaoticSenderKeyStore;
pub use error::StoreError;
pub use memory::MemorySenderKeyStore;

use crate::{name::SenderKeyName, record::SenderKeyRecord};

/// Storage for sender key records, keyed by sender identity.
///
/// Must be Clone (shared between ciphers), Send + Sync (thread-safe), and
/// synchronous. Implementations typically share internal state via Arc, so
/// clones access the same underlying storage.
///
/// Loads return independent copies: mutating a loaded record has no effect
/// until it is passed back to [`store_sender_key`](Self::store_sender_key).
pub trait SenderKeyStore: Clone + Send + Sync + 'static {
    /// Load the record for `name`.
    ///
    /// Returns `None` if no record has been stored for this identity.
    fn load_sender_key(&self, name: &SenderKeyName) -> Result<Option<SenderKeyRecord>, StoreError>;

    /// Store the record for `name`, replacing any previous one.
    ///
    /// # Invariants
    ///
    /// - Post: the record is durable before this returns `Ok`
    fn store_sender_key(
        &self,
        name: &SenderKeyName,
        record: &SenderKeyRecord,
    ) -> Result<(), StoreError>;
}
