/*
    value.rs - In-memory representation of encoded values

    Four shapes, mirroring the wire format:
    - Int: signed 64-bit integer
    - Bytes: arbitrary byte string (text is stored as UTF-8 bytes)
    - List: ordered sequence of values
    - Dict: byte-string keys in ascending byte order
*/

use super::errors::{CodecError, CodecResult};
use std::collections::BTreeMap;

/// Dictionary keyed by raw bytes; BTreeMap keeps keys in canonical order
pub type Dict = BTreeMap<Vec<u8>, Value>;

/// Passthrough bucket for dict entries the reader did not ask for
pub type Unknowns = BTreeMap<Vec<u8>, RawValue>;

/// A decoded value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Int(i64),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Dict(Dict),
}

impl Value {
    /// Build a byte-string value from text
    pub fn text(s: impl Into<String>) -> Self {
        Value::Bytes(s.into().into_bytes())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Byte string interpreted as UTF-8, None if it is not valid text
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_dict(self) -> CodecResult<Dict> {
        match self {
            Value::Dict(d) => Ok(d),
            other => Err(CodecError::WrongType { expected: "dict", found: other.type_name() }),
        }
    }

    pub fn into_list(self) -> CodecResult<Vec<Value>> {
        match self {
            Value::List(l) => Ok(l),
            other => Err(CodecError::WrongType { expected: "list", found: other.type_name() }),
        }
    }

    /// Short name of the value's shape, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
        }
    }

    /// Encode into the canonical wire form
    pub fn encode(&self) -> Vec<u8> {
        super::encode::encode(self)
    }

    /// Decode a complete buffer holding exactly one value
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        super::decode::decode(bytes)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

/// Already-encoded bytes of exactly one value, kept verbatim so that
/// passthrough entries are re-emitted byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue(Vec<u8>);

impl RawValue {
    /// Wrap bytes after checking they hold exactly one well-formed value
    pub fn new(bytes: Vec<u8>) -> CodecResult<Self> {
        super::decode::decode(&bytes)?;
        Ok(RawValue(bytes))
    }

    /// Wrap bytes the decoder has already validated
    pub(crate) fn from_validated(bytes: &[u8]) -> Self {
        RawValue(bytes.to_vec())
    }

    pub fn from_value(value: &Value) -> Self {
        RawValue(value.encode())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn decode(&self) -> CodecResult<Value> {
        super::decode::decode(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_shape() {
        let v = Value::from(42);
        assert_eq!(v.as_int(), Some(42));
        assert_eq!(v.as_bytes(), None);

        let v = Value::text("alice");
        assert_eq!(v.as_str(), Some("alice"));
        assert_eq!(v.as_bytes(), Some(&b"alice"[..]));
    }

    #[test]
    fn test_as_str_rejects_invalid_utf8() {
        let v = Value::Bytes(vec![0xff, 0xfe]);
        assert!(v.as_str().is_none());
        assert!(v.as_bytes().is_some());
    }

    #[test]
    fn test_into_dict_wrong_type() {
        let err = Value::from(1).into_dict().unwrap_err();
        assert_eq!(err, CodecError::WrongType { expected: "dict", found: "int" });
    }

    #[test]
    fn test_raw_value_rejects_garbage() {
        assert!(RawValue::new(b"i12".to_vec()).is_err());
        let raw = RawValue::new(b"3:abc".to_vec()).unwrap();
        assert_eq!(raw.decode().unwrap(), Value::text("abc"));
    }
}
