/*
    message.rs - Config messages as fetched from the swarm

    The hash is an opaque content identifier chosen by the swarm; it is the
    idempotency key and is never recomputed here.
*/

use super::namespace::Namespace;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMessage {
    pub namespace: Namespace,
    pub hash: String,
    pub timestamp_ms: i64,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl ConfigMessage {
    pub fn new(namespace: Namespace, hash: impl Into<String>, timestamp_ms: i64, data: Vec<u8>) -> Self {
        ConfigMessage { namespace, hash: hash.into(), timestamp_ms, data }
    }

    pub fn priority(&self) -> Priority {
        Priority::new(self.timestamp_ms, self.hash.clone())
    }
}

/// Merge priority of a field write.
///
/// Ordered by timestamp, then by hash, so every device observing the same
/// messages picks the same winner. Local writes carry an empty hash and lose
/// ties against anything from the swarm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Priority {
    pub timestamp_ms: i64,
    pub hash: String,
}

impl Priority {
    pub fn new(timestamp_ms: i64, hash: impl Into<String>) -> Self {
        Priority { timestamp_ms, hash: hash.into() }
    }

    pub fn local(timestamp_ms: i64) -> Self {
        Priority { timestamp_ms, hash: String::new() }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp_ms
            .cmp(&other.timestamp_ms)
            .then_with(|| self.hash.as_bytes().cmp(other.hash.as_bytes()))
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
