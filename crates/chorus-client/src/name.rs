//! Sender identity within a group.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one sender's ratchet: a device of a user within a group.
///
/// Used as the store key and the lock key. Two names are the same identity
/// exactly when all three parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenderKeyName {
    /// Group the session belongs to
    pub group_id: String,
    /// Sending user
    pub sender_name: String,
    /// Device of the sending user
    pub device_id: u32,
}

impl SenderKeyName {
    /// Create a sender key name.
    pub fn new(group_id: impl Into<String>, sender_name: impl Into<String>, device_id: u32) -> Self {
        Self { group_id: group_id.into(), sender_name: sender_name.into(), device_id }
    }
}

impl fmt::Display for SenderKeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.group_id, self.sender_name, self.device_id)
    }
}
