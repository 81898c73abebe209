/*
    errors.rs - Error types for the state store

    Every StateError maps onto one ErrorKind, the coarse category reported
    across the boundary.
*/

use crate::core_codec::CompressionError;
use crate::core_config::{DumpError, FieldError, MessageError, Namespace};
use crate::core_identity::IdentityError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidIdentity,
    InvalidDump,
    DecodeFailure,
    CompressionLimitExceeded,
    NotInitialized,
    InvalidField,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidIdentity => "invalid_identity",
            ErrorKind::InvalidDump => "invalid_dump",
            ErrorKind::DecodeFailure => "decode_failure",
            ErrorKind::CompressionLimitExceeded => "compression_limit_exceeded",
            ErrorKind::NotInitialized => "not_initialized",
            ErrorKind::InvalidField => "invalid_field",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[from] IdentityError),

    #[error("account {account} cannot hold namespace {namespace}")]
    AccountMismatch { namespace: Namespace, account: String },

    #[error("invalid dump: {0}")]
    InvalidDump(#[from] DumpError),

    #[error("message {hash} skipped: {source}")]
    DecodeFailure { hash: String, source: MessageError },

    #[error("{namespace} for {account} has not been created")]
    NotInitialized { namespace: Namespace, account: String },

    #[error("{0}")]
    InvalidField(#[from] FieldError),
}

impl StateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StateError::InvalidIdentity(_) | StateError::AccountMismatch { .. } => {
                ErrorKind::InvalidIdentity
            }
            StateError::InvalidDump(DumpError::Compression(CompressionError::LimitExceeded { .. })) => {
                ErrorKind::CompressionLimitExceeded
            }
            StateError::InvalidDump(_) => ErrorKind::InvalidDump,
            StateError::DecodeFailure {
                source: MessageError::Compression(CompressionError::LimitExceeded { .. }),
                ..
            } => ErrorKind::CompressionLimitExceeded,
            StateError::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            StateError::NotInitialized { .. } => ErrorKind::NotInitialized,
            StateError::InvalidField(_) => ErrorKind::InvalidField,
        }
    }
}

/// Result type for state store operations
pub type StateResult<T> = Result<T, StateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = StateError::from(IdentityError::InvalidLength(3));
        assert_eq!(err.kind(), ErrorKind::InvalidIdentity);

        let err = StateError::from(DumpError::Compression(CompressionError::LimitExceeded { limit: 1 }));
        assert_eq!(err.kind(), ErrorKind::CompressionLimitExceeded);

        let err = StateError::from(DumpError::UnsupportedVersion(9));
        assert_eq!(err.kind(), ErrorKind::InvalidDump);
        assert_eq!(err.to_string(), "invalid dump: unsupported dump format version 9");

        let err = StateError::NotInitialized {
            namespace: Namespace::GroupInfo,
            account: "03ab".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::NotInitialized);
        assert_eq!(err.to_string(), "group_info for 03ab has not been created");
    }
}
