/*
    errors.rs - Failures while folding messages or loading dumps
*/

use crate::core_codec::{CodecError, CompressionError};
use thiserror::Error;

/// Why a single message was skipped during merge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("message belongs to namespace {found}, not {expected}")]
    WrongNamespace { expected: &'static str, found: &'static str },

    #[error("payload decompression failed: {0}")]
    Compression(#[from] CompressionError),

    #[error("payload decode failed: {0}")]
    Codec(#[from] CodecError),

    #[error("field '{0}' must be a dict")]
    FieldShape(String),

    #[error("deleted set must be a dict")]
    DeletedShape,
}

/// A dump that cannot be loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DumpError {
    #[error("dump decompression failed: {0}")]
    Compression(#[from] CompressionError),

    #[error("dump decode failed: {0}")]
    Codec(#[from] CodecError),

    #[error("unsupported dump format version {0}")]
    UnsupportedVersion(i64),

    #[error("dump is for namespace {found}, expected {expected}")]
    NamespaceMismatch { expected: i16, found: i64 },

    #[error("malformed dump: {0}")]
    Malformed(String),
}

/// A local write aimed at a field with the other merge rule, or at a
/// reserved key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field '{0}' is reserved")]
    Reserved(String),

    #[error("field '{0}' is keyed, use the entry accessors")]
    NotRegister(String),

    #[error("field '{0}' is not a keyed field")]
    NotKeyed(String),
}
