use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use super::{SenderKeyStore, StoreError};
use crate::{name::SenderKeyName, record::SenderKeyRecord};

/// In-memory sender key store for testing and single-process use
///
/// Records are kept in their serialized form, so every load decodes a fresh
/// copy and the persistence encoding is exercised on every operation. All
/// state is wrapped in Arc<Mutex<>> to allow Clone and concurrent access. A
/// poisoned mutex is reported as `StoreError::Io`.
#[derive(Debug, Clone, Default)]
pub struct MemorySenderKeyStore {
    records: Arc<Mutex<HashMap<SenderKeyName, Vec<u8>>>>,
}

impl MemorySenderKeyStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identities with a stored record.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// True if nothing has been stored.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    /// Serialized record for `name`, exactly as stored.
    ///
    /// Useful for checking that a failed operation left the store untouched.
    pub fn raw_record(&self, name: &SenderKeyName) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SenderKeyName, Vec<u8>>>, StoreError> {
        self.records.lock().map_err(|_| StoreError::Io("memory store mutex poisoned".to_string()))
    }
}

impl SenderKeyStore for MemorySenderKeyStore {
    fn load_sender_key(&self, name: &SenderKeyName) -> Result<Option<SenderKeyRecord>, StoreError> {
        let records = self.lock()?;
        records.get(name).map(|bytes| SenderKeyRecord::from_bytes(bytes.as_slice())).transpose()
    }

    fn store_sender_key(
        &self,
        name: &SenderKeyName,
        record: &SenderKeyRecord,
    ) -> Result<(), StoreError> {
        let bytes = record.to_bytes()?;
        self.lock()?.insert(name.clone(), bytes);
        Ok(())
    }
}
