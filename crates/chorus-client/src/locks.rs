//! Per-identity session locks.
//!
//! A sender key operation is a load → mutate → store sequence that is not
//! idempotent. Two interleaved encrypts for the same identity would reuse a
//! chain key; two interleaved decrypts would lose a skipped key. Every
//! [`GroupCipher`](crate::GroupCipher) operation holds its identity's lock
//! for the whole sequence.
//!
//! Locks are keyed by [`SenderKeyName`] so unrelated identities never contend.
//! The process-wide registry from [`SessionLocks::global`] serializes ciphers
//! that were constructed independently over the same store.
//!
//! # Invariants
//!
//! - At most one mutex exists per name at any time. Entries are only removed
//!   by [`SessionLocks::prune`] while no caller holds a handle.

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, Mutex, PoisonError},
};

use crate::name::SenderKeyName;

static GLOBAL_LOCKS: LazyLock<SessionLocks> = LazyLock::new(SessionLocks::new);

/// Registry of per-identity mutexes.
///
/// Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    locks: Arc<Mutex<HashMap<SenderKeyName, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    /// Create an empty, private registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Self {
        GLOBAL_LOCKS.clone()
    }

    /// Mutex guarding `name`, created on first use.
    ///
    /// Poisoning is ignored by callers: the mutex protects no data, and an
    /// operation that panicked never reached its store step.
    pub fn handle(&self, name: &SenderKeyName) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(name.clone()).or_default())
    }

    /// Number of identities with a registered mutex.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if no mutex is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop mutexes no caller currently holds. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }
}
