//! Chaotic store wrapper for fault injection testing
//!
//! Wraps another store and randomly fails loads and stores. Used to check
//! that a cipher operation interrupted by a storage failure never commits
//! partial ratchet state.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use super::{SenderKeyStore, StoreError};
use crate::{name::SenderKeyName, record::SenderKeyRecord};

/// Store wrapper that injects failures at a configured rate
///
/// Failures are drawn from a seeded generator, so a chaos run is
/// reproducible from its seed. Clones share the generator and counters.
#[derive(Clone)]
pub struct ChaoticSenderKeyStore<S: SenderKeyStore> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    rng: Arc<Mutex<ChaoticRng>>,
    operations: Arc<AtomicUsize>,
    failures: Arc<AtomicUsize>,
}

/// Linear congruential generator (Numerical Recipes constants)
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in [0.0, 1.0)
    fn next_unit(&mut self) -> f64 {
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }
}

impl<S: SenderKeyStore> ChaoticSenderKeyStore<S> {
    /// Wrap `inner` with the default seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Wrap `inner` with an explicit seed for reproducible chaos.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            operations: Arc::new(AtomicUsize::new(0)),
            failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wrapped store (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total load and store calls attempted.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::Relaxed)
    }

    /// Calls that were failed by injection.
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    fn inject(&self, operation: &str) -> Result<(), StoreError> {
        self.operations.fetch_add(1, Ordering::Relaxed);

        // RNG state stays valid even if a holder panicked
        let roll = self.rng.lock().unwrap_or_else(PoisonError::into_inner).next_unit();
        if roll < self.failure_rate {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(StoreError::Io(format!("chaotic failure injection during {operation}")));
        }

        Ok(())
    }
}

impl<S: SenderKeyStore> SenderKeyStore for ChaoticSenderKeyStore<S> {
    fn load_sender_key(&self, name: &SenderKeyName) -> Result<Option<SenderKeyRecord>, StoreError> {
        self.inject("load")?;
        self.inner.load_sender_key(name)
    }

    fn store_sender_key(
        &self,
        name: &SenderKeyName,
        record: &SenderKeyRecord,
    ) -> Result<(), StoreError> {
        self.inject("store")?;
        self.inner.store_sender_key(name, record)
    }
}
