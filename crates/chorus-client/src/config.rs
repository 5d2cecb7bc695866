//! Group cipher configuration.

/// Default bound on how far ahead of the chain a message may claim to be.
pub const DEFAULT_MAX_FUTURE_SKIP: u32 = 2000;

/// Default capacity of each state's skipped-key cache.
pub const DEFAULT_MAX_MESSAGE_KEYS: usize = 2000;

/// Limits applied by [`GroupCipher`](crate::GroupCipher) when decrypting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCipherConfig {
    /// Maximum `iteration - current` accepted before a message is rejected.
    ///
    /// Bounds the chain work and cache growth a single message can force.
    pub max_future_skip: u32,

    /// Maximum skipped message keys cached per state. Oldest keys are evicted
    /// first once full.
    ///
    /// Should be at least `max_future_skip`, otherwise a legitimate gap can
    /// evict its own early keys.
    pub max_message_keys: usize,
}

impl Default for GroupCipherConfig {
    fn default() -> Self {
        Self {
            max_future_skip: DEFAULT_MAX_FUTURE_SKIP,
            max_message_keys: DEFAULT_MAX_MESSAGE_KEYS,
        }
    }
}
