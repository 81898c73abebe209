//! Account identifiers
//!
//! An account id is a one-byte prefix plus a 32-byte public key, written as
//! 66 lowercase hex characters. `0x05` marks a user account, `0x03` a group.

use super::encoding::decode_pubkey;
use super::IdentityError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const PREFIX_USER: u8 = 0x05;
pub const PREFIX_GROUP: u8 = 0x03;

/// Canonical binary account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId {
    prefix: u8,
    key: [u8; 32],
}

impl AccountId {
    pub fn new(prefix: u8, key: [u8; 32]) -> Self {
        AccountId { prefix, key }
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// The prefix-stripped 32-byte public key
    pub fn pubkey(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn is_user(&self) -> bool {
        self.prefix == PREFIX_USER
    }

    pub fn is_group(&self) -> bool {
        self.prefix == PREFIX_GROUP
    }

    /// 33 bytes: prefix then key
    pub fn to_bytes(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = self.prefix;
        out[1..].copy_from_slice(&self.key);
        out
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{}", self.prefix, hex::encode(self.key))
    }
}

/// Strict parse: 66 hex characters with a known prefix
impl FromStr for AccountId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 66 {
            return Err(IdentityError::InvalidLength(s.len()));
        }
        let bytes = hex::decode(s).map_err(|e| IdentityError::InvalidEncoding(e.to_string()))?;
        let prefix = bytes[0];
        if prefix != PREFIX_USER && prefix != PREFIX_GROUP {
            return Err(IdentityError::UnknownPrefix(prefix));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes[1..]);
        Ok(AccountId { prefix, key })
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Normalize any accepted textual form into an account id.
///
/// A 66-hex id must already carry `expected_prefix`; a bare 32-byte key in
/// hex, base32z or base64 has the prefix attached.
pub fn normalize(text: &str, expected_prefix: u8) -> Result<AccountId, IdentityError> {
    if text.len() == 66 {
        let bytes = hex::decode(text).map_err(|e| IdentityError::InvalidEncoding(e.to_string()))?;
        if bytes[0] != expected_prefix {
            return Err(IdentityError::WrongPrefix { expected: expected_prefix, found: bytes[0] });
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes[1..]);
        return Ok(AccountId::new(expected_prefix, key));
    }
    decode_pubkey(text).map(|key| AccountId::new(expected_prefix, key))
}

/// True for 66 hex characters carrying a known prefix
pub fn validate_account_id(text: &str) -> bool {
    text.parse::<AccountId>().is_ok()
}
