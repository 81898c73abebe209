/*
    errors.rs - Error types for the codec subsystem
*/

use thiserror::Error;

/// Structural decode failures. Every malformed input maps to one of these,
/// the decoder never panics on hostile bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input at offset {offset}")]
    Truncated { offset: usize },

    #[error("unexpected byte 0x{byte:02x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    #[error("invalid integer at offset {offset}")]
    InvalidInteger { offset: usize },

    #[error("invalid byte string length at offset {offset}")]
    InvalidLength { offset: usize },

    #[error("dict keys not strictly ascending at offset {offset}")]
    UnsortedKeys { offset: usize },

    #[error("trailing data at offset {offset}")]
    TrailingData { offset: usize },

    #[error("nesting deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("expected {expected}, found {found}")]
    WrongType { expected: &'static str, found: &'static str },
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::UnexpectedByte { byte: 0x7a, offset: 3 };
        assert_eq!(err.to_string(), "unexpected byte 0x7a at offset 3");

        let err = CodecError::WrongType { expected: "dict", found: "int" };
        assert!(err.to_string().contains("expected dict"));
    }
}
