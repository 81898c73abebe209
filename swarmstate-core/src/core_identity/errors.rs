//! Identity error types

use thiserror::Error;

/// Malformed account ids, public keys or seeds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("invalid account id length {0}: expected 66 hex characters")]
    InvalidLength(usize),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("unexpected account id prefix 0x{found:02x}, expected 0x{expected:02x}")]
    WrongPrefix { expected: u8, found: u8 },

    #[error("unknown account id prefix 0x{0:02x}")]
    UnknownPrefix(u8),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}
