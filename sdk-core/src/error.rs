//! Tessera error types

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Update or finalize called on a state that was already finalized
    #[error("Invalid state: operation already finalized")]
    InvalidState,

    /// Tag or signature mismatch. Carries no detail.
    #[error("Authentication failure")]
    AuthenticationFailure,

    #[error("Requested length {requested} exceeds maximum {max}")]
    LengthError { requested: usize, max: usize },

    /// The OS entropy source failed. Callers must abort, not retry with a weaker source.
    #[error("Entropy unavailable")]
    EntropyUnavailable,

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid key")]
    InvalidKey,

    #[error("Invalid encoding")]
    InvalidEncoding,

    #[error("Missing private key")]
    MissingPrivateKey,

    #[error("Unknown key id: {0}")]
    UnknownKeyId(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_no_detail() {
        assert_eq!(
            CryptoError::AuthenticationFailure.to_string(),
            "Authentication failure"
        );
        assert_eq!(
            CryptoError::LengthError { requested: 9000, max: 8160 }.to_string(),
            "Requested length 9000 exceeds maximum 8160"
        );
    }
}
