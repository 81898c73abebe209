//! Shared fixtures for the merge-law suites

use crate::config::EngineConfig;
use crate::core_codec::{encode, Dict, Value};
use crate::core_config::{ConfigKind, ConfigMessage, ConfigState, Namespace};
use crate::core_identity::{AccountId, PREFIX_GROUP, PREFIX_USER};

pub fn user_account() -> AccountId {
    AccountId::new(PREFIX_USER, [0xa1; 32])
}

pub fn group_account() -> AccountId {
    AccountId::new(PREFIX_GROUP, [0xb2; 32])
}

pub fn fresh(kind: ConfigKind) -> ConfigState {
    let account = if kind.namespace().is_group() { group_account() } else { user_account() };
    ConfigState::new(kind, account, &EngineConfig::default())
}

/// Build a dict from `(key, value)` pairs
pub fn dict(entries: &[(&str, Value)]) -> Dict {
    entries
        .iter()
        .map(|(k, v)| (k.as_bytes().to_vec(), v.clone()))
        .collect()
}

pub fn message(ns: Namespace, hash: &str, ts: i64, fragment: &[(&str, Value)]) -> ConfigMessage {
    ConfigMessage::new(ns, hash, ts, encode(&Value::Dict(dict(fragment))))
}

pub fn profile_msg(hash: &str, ts: i64, fragment: &[(&str, Value)]) -> ConfigMessage {
    message(Namespace::UserProfile, hash, ts, fragment)
}
