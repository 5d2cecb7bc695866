//! Error types for the wire protocol.

use thiserror::Error;

/// Result alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from encoding or decoding sender key messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer too short to hold a version byte and a signature
    #[error("message too short: expected at least {expected} bytes, got {actual}")]
    MessageTooShort {
        /// Minimum size
        expected: usize,
        /// Received size
        actual: usize,
    },

    /// Buffer exceeds the maximum message size
    #[error("message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge {
        /// Received size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Message was produced by an older protocol version
    #[error("legacy message version: {0}")]
    LegacyVersion(u8),

    /// Message was produced by a newer, unknown protocol version
    #[error("unsupported message version: {0}")]
    UnsupportedVersion(u8),

    /// CBOR body encoding failed
    #[error("CBOR encode error: {0}")]
    CborEncode(String),

    /// CBOR body decoding failed
    #[error("CBOR decode error: {0}")]
    CborDecode(String),
}

impl ProtocolError {
    /// Returns true if the message is well-formed but from an old peer.
    ///
    /// Legacy messages are reported separately so callers can prompt the
    /// sender to upgrade instead of treating the input as an attack.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyVersion(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_version_is_legacy() {
        assert!(ProtocolError::LegacyVersion(2).is_legacy());
        assert!(!ProtocolError::UnsupportedVersion(4).is_legacy());
    }

    #[test]
    fn error_display() {
        let err = ProtocolError::MessageTooShort { expected: 65, actual: 3 };
        assert_eq!(err.to_string(), "message too short: expected at least 65 bytes, got 3");
    }
}
