//! Error types for Sender Keys primitives

use thiserror::Error;

/// Errors from sender key cryptographic operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Ratchet iteration would overflow
    #[error("chain iteration overflow at {current}")]
    IterationOverflow {
        /// Current iteration when overflow was detected
        current: u32,
    },

    /// Decryption failed (bad padding, truncated or corrupt ciphertext)
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Reason for decryption failure
        reason: String,
    },

    /// Signature was malformed or did not verify
    #[error("invalid signature: {reason}")]
    InvalidSignature {
        /// Reason for rejection
        reason: String,
    },
}

impl CryptoError {
    /// Returns true if this error was caused by untrusted input.
    ///
    /// Input errors reject a single message. The remaining variant,
    /// `IterationOverflow`, means the chain itself is used up and the sender
    /// must rekey.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::DecryptionFailed { .. } | Self::InvalidSignature { .. } => true,
            Self::IterationOverflow { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_failed_is_input_error() {
        let err = CryptoError::DecryptionFailed { reason: "bad padding".to_string() };
        assert!(err.is_input_error());
    }

    #[test]
    fn overflow_is_not_input_error() {
        let err = CryptoError::IterationOverflow { current: u32::MAX };
        assert!(!err.is_input_error());
    }

    #[test]
    fn error_display() {
        let err = CryptoError::IterationOverflow { current: 10 };
        assert_eq!(err.to_string(), "chain iteration overflow at 10");
    }
}
