/*
    encode.rs - Canonical encoder

    Output is canonical: dict keys are written in ascending byte order and
    integers carry no padding, so encoding an unchanged value twice always
    yields identical bytes.
*/

use super::value::{RawValue, Unknowns, Value};
use std::collections::BTreeMap;

/// Encode a value into a fresh buffer
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

/// Append the encoding of `value` to `out`
pub fn encode_into(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Int(i) => encode_int(*i, out),
        Value::Bytes(b) => encode_bytes(b, out),
        Value::List(items) => {
            out.push(b'l');
            for item in items {
                encode_into(item, out);
            }
            out.push(b'e');
        }
        Value::Dict(entries) => {
            out.push(b'd');
            for (key, item) in entries {
                encode_bytes(key, out);
                encode_into(item, out);
            }
            out.push(b'e');
        }
    }
}

fn encode_int(i: i64, out: &mut Vec<u8>) {
    out.push(b'i');
    out.extend_from_slice(i.to_string().as_bytes());
    out.push(b'e');
}

fn encode_bytes(b: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(b.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(b);
}

/// Builds a dict from known entries plus passthrough raw entries.
///
/// Known entries always win over passthrough entries with the same key, so a
/// recognised field overwrites a stale unknown copy of itself.
#[derive(Debug, Default, Clone)]
pub struct DictBuilder {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl DictBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite) a known entry
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: &Value) -> &mut Self {
        self.entries.insert(key.into(), encode(value));
        self
    }

    /// Insert (or overwrite) an entry whose value is already encoded
    pub fn insert_raw(&mut self, key: impl Into<Vec<u8>>, raw: &RawValue) -> &mut Self {
        self.entries.insert(key.into(), raw.as_bytes().to_vec());
        self
    }

    /// Re-emit passthrough entries; keys already present are left alone
    pub fn passthrough(&mut self, unknowns: &Unknowns) -> &mut Self {
        for (key, raw) in unknowns {
            self.entries
                .entry(key.clone())
                .or_insert_with(|| raw.as_bytes().to_vec());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.entries.values().map(Vec::len).sum::<usize>());
        out.push(b'd');
        for (key, raw) in self.entries {
            encode_bytes(&key, &mut out);
            out.extend_from_slice(&raw);
        }
        out.push(b'e');
        out
    }
}
