//! Group cipher errors.

use chorus_crypto::CryptoError;
use chorus_proto::ProtocolError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by [`GroupCipher`](crate::GroupCipher) operations.
///
/// Every message-level rejection is terminal for that message: callers must
/// not retry `InvalidMessage`, `DuplicateMessage` or `LegacyMessage`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupCipherError {
    /// No sending state exists for this identity
    #[error("no sender key session")]
    NoSession,

    /// Message is malformed, forged, or outside the accepted window
    #[error("invalid message: {reason}")]
    InvalidMessage {
        /// Why the message was rejected
        reason: String,
    },

    /// Message key for this iteration was already consumed or evicted
    #[error("duplicate message: iteration {received} is behind chain at {current}")]
    DuplicateMessage {
        /// Current chain iteration
        current: u32,
        /// Iteration claimed by the message
        received: u32,
    },

    /// Message uses an older envelope version
    #[error("legacy message version: {version}")]
    LegacyMessage {
        /// Version found in the envelope
        version: u8,
    },

    /// Sending chain has reached its last iteration
    #[error("sender chain exhausted for key {key_id}")]
    ChainExhausted {
        /// Key id of the exhausted state
        key_id: u32,
    },

    /// Loading or storing the record failed
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl GroupCipherError {
    /// Returns true if repeating the same call may succeed.
    ///
    /// Only storage failures are transient. Nothing was persisted, so the
    /// caller can retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidMessage { reason: reason.into() }
    }
}

impl From<ProtocolError> for GroupCipherError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::LegacyVersion(version) => Self::LegacyMessage { version },
            other => Self::InvalidMessage { reason: other.to_string() },
        }
    }
}

impl From<CryptoError> for GroupCipherError {
    fn from(err: CryptoError) -> Self {
        Self::InvalidMessage { reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_protocol_error_maps_to_legacy_message() {
        let err = GroupCipherError::from(ProtocolError::LegacyVersion(2));
        assert_eq!(err, GroupCipherError::LegacyMessage { version: 2 });
    }

    #[test]
    fn other_protocol_errors_are_invalid() {
        let err = GroupCipherError::from(ProtocolError::UnsupportedVersion(5));
        assert!(matches!(err, GroupCipherError::InvalidMessage { .. }));
    }

    #[test]
    fn only_storage_is_retryable() {
        assert!(GroupCipherError::Storage(StoreError::Io("disk".into())).is_retryable());
        assert!(!GroupCipherError::NoSession.is_retryable());
        assert!(!GroupCipherError::DuplicateMessage { current: 3, received: 1 }.is_retryable());
    }

    #[test]
    fn error_display() {
        let err = GroupCipherError::DuplicateMessage { current: 5, received: 2 };
        assert_eq!(err.to_string(), "duplicate message: iteration 2 is behind chain at 5");
    }
}
