/*
    state.rs - ConfigState: one mergeable config per (namespace, account)

    Merge discipline:
    - a message hash is applied at most once (applied_hashes only grows)
    - a message is validated whole before any field is touched; a message
      that fails validation is skipped and left out of applied_hashes so a
      later delivery can retry it
    - each field keeps the value with the highest (timestamp, hash) priority
    - every accepted message makes the state dirty; only a change to the
      live view queues a push, so echoes of converged values stop here

    Dump layout (canonical dict):
        "#" format version
        "d" recognised fields
        "k" namespace tag
        "u" unknown fields
    plus any other top-level keys found on load, re-emitted verbatim.
*/

use super::document::{ConfigDocument, Field, DELETED_KEY};
use super::errors::{DumpError, FieldError, MessageError};
use super::message::{ConfigMessage, Priority};
use super::namespace::Namespace;
use super::schema::{ConfigKind, FieldRule};
use crate::config::{EngineConfig, LimitsConfig};
use crate::core_codec::{decode, encode, Compressor, Dict, DictBuilder, DictConsumer, Unknowns, Value};
use crate::core_identity::AccountId;
use crate::metrics;
use std::collections::{BTreeSet, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DUMP_FORMAT_VERSION: i64 = 1;

/// Outcome of one merge call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Newly applied hashes, in input order
    pub accepted: Vec<String>,
    /// Messages whose hash had already been applied
    pub duplicates: usize,
    /// Messages that failed validation, with the reason
    pub skipped: Vec<(String, MessageError)>,
    /// Whether any live value changed
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct ConfigState {
    kind: ConfigKind,
    account: AccountId,
    document: ConfigDocument,
    passthrough: Unknowns,
    applied_hashes: HashSet<String>,
    needs_dump: bool,
    needs_push: bool,
    compressor: Compressor,
    limits: LimitsConfig,
}

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

impl ConfigState {
    pub fn new(kind: ConfigKind, account: AccountId, config: &EngineConfig) -> Self {
        ConfigState {
            kind,
            account,
            document: ConfigDocument::new(),
            passthrough: Unknowns::new(),
            applied_hashes: HashSet::new(),
            needs_dump: false,
            needs_push: false,
            compressor: Compressor::new(&config.compression),
            limits: config.limits.clone(),
        }
    }

    /// Fresh state rehydrated from a single-namespace dump
    pub fn from_dump(
        kind: ConfigKind,
        account: AccountId,
        config: &EngineConfig,
        dump: &[u8],
    ) -> Result<Self, DumpError> {
        let mut state = Self::new(kind, account, config);
        state.load(dump)?;
        Ok(state)
    }

    pub fn kind(&self) -> ConfigKind {
        self.kind
    }

    pub fn namespace(&self) -> Namespace {
        self.kind.namespace()
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn needs_dump(&self) -> bool {
        self.needs_dump
    }

    pub fn needs_push(&self) -> bool {
        self.needs_push
    }

    pub fn has_applied(&self, hash: &str) -> bool {
        self.applied_hashes.contains(hash)
    }

    pub fn applied_hashes(&self) -> &HashSet<String> {
        &self.applied_hashes
    }

    /// Hashes of swarm messages whose writes are still part of the document
    pub fn current_hashes(&self) -> BTreeSet<String> {
        self.document.current_hashes()
    }

    pub(crate) fn mark_needs_dump(&mut self) {
        self.needs_dump = true;
    }

    pub(crate) fn mark_needs_push(&mut self) {
        self.needs_push = true;
    }

    /// Fold `messages` into the document
    pub fn merge<'m>(&mut self, messages: impl IntoIterator<Item = &'m ConfigMessage>) -> MergeReport {
        let mut report = MergeReport::default();

        for msg in messages {
            if self.applied_hashes.contains(&msg.hash) {
                report.duplicates += 1;
                continue;
            }
            let fragment = match self.decode_fragment(msg) {
                Ok(fragment) => fragment,
                Err(e) => {
                    report.skipped.push((msg.hash.clone(), e));
                    continue;
                }
            };

            if self.document.apply_fragment(self.kind, fragment, &msg.priority()) {
                report.changed = true;
            }
            self.applied_hashes.insert(msg.hash.clone());
            report.accepted.push(msg.hash.clone());
        }

        if !report.accepted.is_empty() {
            self.needs_dump = true;
        }
        if report.changed {
            self.needs_push = true;
        }

        tracing::debug!(
            namespace = %self.namespace(),
            account = %self.account,
            accepted = report.accepted.len(),
            changed = report.changed,
            duplicates = report.duplicates,
            skipped = report.skipped.len(),
            "merged config messages"
        );
        metrics::record_merge(
            self.namespace().name(),
            report.accepted.len(),
            report.duplicates,
            report.skipped.len(),
        );

        report
    }

    fn decode_fragment(&self, msg: &ConfigMessage) -> Result<Dict, MessageError> {
        if msg.namespace != self.namespace() {
            return Err(MessageError::WrongNamespace {
                expected: self.namespace().name(),
                found: msg.namespace.name(),
            });
        }
        let payload = self.compressor.unpack(&msg.data, self.limits.max_message_size)?;
        let fragment = decode(&payload)?.into_dict()?;
        self.check_shape(&fragment)?;
        if let Some(deleted) = fragment.get(DELETED_KEY) {
            let deleted = deleted.as_dict().ok_or(MessageError::DeletedShape)?;
            self.check_shape(deleted)?;
        }
        Ok(fragment)
    }

    fn check_shape(&self, fragment: &Dict) -> Result<(), MessageError> {
        for (key, value) in fragment {
            if self.kind.rule(key) == Some(FieldRule::Keyed) && value.as_dict().is_none() {
                return Err(MessageError::FieldShape(String::from_utf8_lossy(key).into_owned()));
            }
        }
        Ok(())
    }

    fn local_priority(current: Option<&Field>) -> Priority {
        let floor = current.map_or(0, |f| f.priority().timestamp_ms.saturating_add(1));
        Priority::local(now_ms().max(floor))
    }

    /// Live value of a register field, recognised or unknown
    pub fn get_field(&self, key: &str) -> Option<&Value> {
        self.document.register(key.as_bytes()).and_then(Field::value)
    }

    /// Local write of a register field; `None` clears it.
    /// Returns whether the live value changed.
    pub fn set_field(&mut self, key: &str, value: Option<Value>) -> Result<bool, FieldError> {
        if key.as_bytes() == DELETED_KEY {
            return Err(FieldError::Reserved(key.to_string()));
        }
        if self.kind.rule(key.as_bytes()) == Some(FieldRule::Keyed) {
            return Err(FieldError::NotRegister(key.to_string()));
        }
        let current = self.document.register(key.as_bytes());
        if current.and_then(Field::value) == value.as_ref() {
            return Ok(false);
        }
        let priority = Self::local_priority(current);
        self.document.put_register(self.kind, key.as_bytes(), value, &priority);
        self.mark_local_change();
        Ok(true)
    }

    pub fn get_entry(&self, key: &str, entry: &[u8]) -> Option<&Value> {
        self.document.entry(key.as_bytes(), entry).and_then(Field::value)
    }

    /// Live entries of a keyed field
    pub fn entries(&self, key: &str) -> Vec<(&[u8], &Value)> {
        self.document.entries(key.as_bytes()).collect()
    }

    /// Local write of one entry of a keyed field; `None` clears it
    pub fn set_entry(&mut self, key: &str, entry: &[u8], value: Option<Value>) -> Result<bool, FieldError> {
        if self.kind.rule(key.as_bytes()) != Some(FieldRule::Keyed) {
            return Err(FieldError::NotKeyed(key.to_string()));
        }
        let current = self.document.entry(key.as_bytes(), entry);
        if current.and_then(Field::value) == value.as_ref() {
            return Ok(false);
        }
        let priority = Self::local_priority(current);
        self.document.put_entry(key.as_bytes(), entry, value, &priority);
        self.mark_local_change();
        Ok(true)
    }

    fn mark_local_change(&mut self) {
        self.needs_dump = true;
        self.needs_push = true;
    }

    /// Encoded live values and tombstones, the payload pushed to the swarm
    pub fn push_fragment(&self) -> Vec<u8> {
        encode(&Value::Dict(self.document.fragment()))
    }

    /// Packed push fragment if anything changed since the last call
    pub fn take_push(&mut self) -> Option<Vec<u8>> {
        if !self.needs_push {
            return None;
        }
        self.needs_push = false;
        Some(self.compressor.pack(self.push_fragment()))
    }

    /// Uncompressed dump bytes, without touching the dirty flag
    pub fn encode_dump(&self) -> Vec<u8> {
        let (recognised, unknown) = self.document.to_dump_parts();
        let mut builder = DictBuilder::new();
        builder
            .insert("#", &Value::Int(DUMP_FORMAT_VERSION))
            .insert("d", &recognised)
            .insert("k", &Value::Int(i64::from(self.namespace().tag())))
            .insert("u", &unknown)
            .passthrough(&self.passthrough);
        builder.finish()
    }

    /// Serialize the state and clear `needs_dump`
    pub fn dump(&mut self) -> Vec<u8> {
        let bytes = self.compressor.pack(self.encode_dump());
        self.needs_dump = false;
        metrics::record_dump(self.namespace().name(), bytes.len());
        bytes
    }

    /// Take over the document of a freshly loaded state, keeping our own
    /// `applied_hashes`
    pub(crate) fn absorb(&mut self, loaded: ConfigState) {
        self.document = loaded.document;
        self.passthrough = loaded.passthrough;
        self.needs_dump = false;
        self.needs_push = false;
    }

    /// Replace the document from a dump. `applied_hashes` is left alone.
    pub fn load(&mut self, dump: &[u8]) -> Result<(), DumpError> {
        let raw = self.compressor.unpack(dump, self.limits.max_dump_size)?;
        let (document, passthrough) = parse_dump(self.kind, &raw)?;
        self.document = document;
        self.passthrough = passthrough;
        self.needs_dump = false;
        self.needs_push = false;
        Ok(())
    }
}

fn parse_dump(kind: ConfigKind, raw: &[u8]) -> Result<(ConfigDocument, Unknowns), DumpError> {
    let mut passthrough = Unknowns::new();
    let mut consumer = DictConsumer::new(raw)?;

    let version = consumer
        .seek_value(b"#", &mut passthrough)?
        .and_then(|v| v.as_int())
        .ok_or_else(|| DumpError::Malformed("missing format version".to_string()))?;
    if !(1..=DUMP_FORMAT_VERSION).contains(&version) {
        return Err(DumpError::UnsupportedVersion(version));
    }

    let recognised = consumer
        .seek_value(b"d", &mut passthrough)?
        .map(Value::into_dict)
        .transpose()?
        .unwrap_or_default();

    let expected = kind.namespace().tag();
    match consumer.seek_value(b"k", &mut passthrough)?.and_then(|v| v.as_int()) {
        Some(found) if found == i64::from(expected) => {}
        Some(found) => return Err(DumpError::NamespaceMismatch { expected, found }),
        None => return Err(DumpError::Malformed("missing namespace".to_string())),
    }

    let unknown = consumer
        .seek_value(b"u", &mut passthrough)?
        .map(Value::into_dict)
        .transpose()?
        .unwrap_or_default();
    consumer.finish(&mut passthrough)?;

    let document = ConfigDocument::from_dump_parts(kind, recognised, unknown)?;
    Ok((document, passthrough))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_codec::{compress, CompressionError, RawValue, COMPRESSION_MARKER};
    use crate::core_identity::PREFIX_USER;

    fn account() -> AccountId {
        AccountId::new(PREFIX_USER, [0x11; 32])
    }

    fn profile() -> ConfigState {
        ConfigState::new(ConfigKind::UserProfile, account(), &EngineConfig::default())
    }

    fn name_msg(hash: &str, ts: i64, name: &str) -> ConfigMessage {
        let mut d = Dict::new();
        d.insert(b"n".to_vec(), Value::text(name));
        ConfigMessage::new(Namespace::UserProfile, hash, ts, encode(&Value::Dict(d)))
    }

    #[test]
    fn test_merge_accepts_and_marks_dirty() {
        let mut state = profile();
        assert!(!state.needs_dump());

        let report = state.merge(&[name_msg("h1", 100, "alice")]);
        assert_eq!(report.accepted, vec!["h1".to_string()]);
        assert!(state.needs_dump());
        assert!(state.has_applied("h1"));
        assert_eq!(state.get_field("n"), Some(&Value::text("alice")));
    }

    #[test]
    fn test_duplicate_hash_not_reapplied() {
        let mut state = profile();
        state.merge(&[name_msg("h1", 100, "alice")]);
        state.dump();

        let report = state.merge(&[name_msg("h1", 100, "alice")]);
        assert!(report.accepted.is_empty());
        assert_eq!(report.duplicates, 1);
        assert!(!state.needs_dump());
    }

    #[test]
    fn test_duplicate_within_one_batch() {
        let mut state = profile();
        let report = state.merge(&[name_msg("h1", 100, "a"), name_msg("h1", 100, "a")]);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn test_older_message_loses() {
        let mut state = profile();
        state.merge(&[name_msg("h1", 100, "alice")]);
        let report = state.merge(&[name_msg("h2", 50, "bob")]);
        assert_eq!(report.accepted, vec!["h2".to_string()]);
        assert_eq!(state.get_field("n"), Some(&Value::text("alice")));
    }

    #[test]
    fn test_undecodable_message_skipped_and_retryable() {
        let mut state = profile();
        let bad = ConfigMessage::new(Namespace::UserProfile, "h1", 100, b"d1:n".to_vec());
        let report = state.merge(&[bad]);
        assert!(report.accepted.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(!state.has_applied("h1"));
        assert!(!state.needs_dump());

        let report = state.merge(&[name_msg("h1", 100, "alice")]);
        assert_eq!(report.accepted, vec!["h1".to_string()]);
    }

    #[test]
    fn test_keyed_field_must_be_dict() {
        let mut state = ConfigState::new(ConfigKind::Contacts, account(), &EngineConfig::default());
        let mut d = Dict::new();
        d.insert(b"c".to_vec(), Value::from(1));
        d.insert(b"x".to_vec(), Value::from(2));
        let msg = ConfigMessage::new(Namespace::Contacts, "h1", 1, encode(&Value::Dict(d)));
        let report = state.merge(&[msg]);
        assert!(matches!(report.skipped[0].1, MessageError::FieldShape(_)));
        // nothing from the message leaked into the document
        assert!(state.document().is_empty());
    }

    #[test]
    fn test_wrong_namespace_skipped() {
        let mut state = profile();
        let msg = ConfigMessage::new(Namespace::Contacts, "h1", 1, b"de".to_vec());
        let report = state.merge(&[msg]);
        assert!(matches!(report.skipped[0].1, MessageError::WrongNamespace { .. }));
    }

    #[test]
    fn test_oversized_compressed_payload_skipped() {
        let mut state = profile();
        let mut d = Dict::new();
        d.insert(b"n".to_vec(), Value::Bytes(vec![b'a'; 10 * 1024 * 1024]));
        let payload = compress(&encode(&Value::Dict(d)), 9, &[COMPRESSION_MARKER]).unwrap();
        let msg = ConfigMessage::new(Namespace::UserProfile, "big", 1, payload);

        let report = state.merge(&[msg]);
        assert!(matches!(
            report.skipped[0].1,
            MessageError::Compression(CompressionError::LimitExceeded { .. })
        ));
        assert!(state.get_field("n").is_none());
    }

    #[test]
    fn test_local_write_wins_locally_and_loses_ties() {
        let mut state = profile();
        state.merge(&[name_msg("h1", 100, "alice")]);
        assert!(state.set_field("n", Some(Value::text("local"))).unwrap());
        assert_eq!(state.get_field("n"), Some(&Value::text("local")));

        let ts = state.document().register(b"n").unwrap().priority().timestamp_ms;
        state.merge(&[name_msg("h2", ts, "remote")]);
        assert_eq!(state.get_field("n"), Some(&Value::text("remote")));
    }

    #[test]
    fn test_set_field_unchanged_is_noop() {
        let mut state = profile();
        assert!(!state.set_field("n", None).unwrap());
        assert!(!state.needs_dump());
        assert!(state.set_field("n", Some(Value::text("a"))).unwrap());
        assert!(!state.set_field("n", Some(Value::text("a"))).unwrap());
    }

    #[test]
    fn test_field_rule_mismatch() {
        let mut state = ConfigState::new(ConfigKind::Contacts, account(), &EngineConfig::default());
        assert_eq!(
            state.set_field("c", Some(Value::from(1))),
            Err(FieldError::NotRegister("c".to_string()))
        );
        assert!(state.set_entry("c", b"alice", Some(Value::from(1))).unwrap());
        assert_eq!(state.get_entry("c", b"alice"), Some(&Value::from(1)));
        assert_eq!(state.entries("c").len(), 1);
        assert_eq!(
            state.set_entry("n", b"x", None),
            Err(FieldError::NotKeyed("n".to_string()))
        );
    }

    #[test]
    fn test_dump_load_roundtrip() {
        let mut state = profile();
        state.merge(&[name_msg("h1", 100, "alice")]);
        state.set_field("p", Some(Value::text("https://pic"))).unwrap();
        state.set_field("p", None).unwrap();
        let dump = state.dump();
        assert!(!state.needs_dump());

        let loaded = ConfigState::from_dump(ConfigKind::UserProfile, account(), &EngineConfig::default(), &dump).unwrap();
        assert_eq!(loaded.document(), state.document());
        assert!(!loaded.needs_dump());
        assert!(loaded.applied_hashes().is_empty());
    }

    #[test]
    fn test_dump_is_deterministic() {
        let mut state = profile();
        state.merge(&[name_msg("h1", 100, "alice")]);
        assert_eq!(state.encode_dump(), state.encode_dump());
        assert_eq!(
            state.encode_dump(),
            b"d1:#i1e1:dd1:nli100e2:h15:aliceee1:ki2e1:udee".to_vec()
        );
    }

    #[test]
    fn test_load_keeps_applied_hashes() {
        let mut state = profile();
        state.merge(&[name_msg("h1", 100, "alice")]);
        let dump = state.dump();
        state.load(&dump).unwrap();
        assert!(state.has_applied("h1"));
    }

    #[test]
    fn test_load_rejects_bad_dumps() {
        let mut state = profile();
        assert!(matches!(state.load(b"d1:#i2e1:ki2ee"), Err(DumpError::UnsupportedVersion(2))));
        assert!(matches!(
            state.load(b"d1:#i1e1:ki3ee"),
            Err(DumpError::NamespaceMismatch { expected: 2, found: 3 })
        ));
        assert!(matches!(state.load(b"d1:ki2ee"), Err(DumpError::Malformed(_))));
        assert!(matches!(state.load(b"garbage"), Err(DumpError::Codec(_))));
    }

    #[test]
    fn test_unknown_top_level_keys_survive() {
        let mut state = profile();
        let dump = b"d1:!3:old1:#i1e1:dde1:ki2e1:ude1:zli1eee";
        state.load(dump).unwrap();
        assert_eq!(state.encode_dump(), dump.to_vec());

        state.set_field("n", Some(Value::text("alice"))).unwrap();
        let again = state.encode_dump();
        let mut consumer = DictConsumer::new(&again).unwrap();
        let mut unknowns = Unknowns::new();
        consumer.seek(b"u", &mut unknowns).unwrap();
        consumer.finish(&mut unknowns).unwrap();
        assert_eq!(unknowns[&b"!".to_vec()], RawValue::new(b"3:old".to_vec()).unwrap());
        assert_eq!(unknowns[&b"z".to_vec()], RawValue::new(b"li1ee".to_vec()).unwrap());
    }

    #[test]
    fn test_unchanged_merge_does_not_queue_push() {
        let mut state = profile();
        state.merge(&[name_msg("h1", 100, "alice")]);
        state.take_push();
        state.dump();

        let report = state.merge(&[name_msg("h2", 200, "alice")]);
        assert_eq!(report.accepted, vec!["h2".to_string()]);
        assert!(!report.changed);
        assert!(state.needs_dump());
        assert!(!state.needs_push());
        assert!(state.take_push().is_none());

        assert!(state.merge(&[name_msg("h3", 300, "bob")]).changed);
        assert!(state.needs_push());
    }

    #[test]
    fn test_push_carries_clear() {
        let mut sender = profile();
        sender.set_field("n", Some(Value::text("alice"))).unwrap();
        let mut receiver = profile();
        let push = sender.take_push().unwrap();
        receiver.merge(&[ConfigMessage::new(Namespace::UserProfile, "h1", now_ms() + 1000, push)]);
        assert_eq!(receiver.get_field("n"), Some(&Value::text("alice")));

        sender.set_field("n", None).unwrap();
        let push = sender.take_push().unwrap();
        assert_eq!(push, b"d1:-d1:n0:ee".to_vec());
        let report = receiver.merge(&[ConfigMessage::new(Namespace::UserProfile, "h2", now_ms() + 2000, push)]);
        assert!(report.changed);
        assert_eq!(receiver.get_field("n"), None);
    }

    #[test]
    fn test_deleted_set_shape_checked() {
        let mut state = ConfigState::new(ConfigKind::Contacts, account(), &EngineConfig::default());
        let msg = ConfigMessage::new(Namespace::Contacts, "h1", 1, b"d1:-i1ee".to_vec());
        assert!(matches!(state.merge(&[msg]).skipped[0].1, MessageError::DeletedShape));

        let msg = ConfigMessage::new(Namespace::Contacts, "h2", 1, b"d1:-d1:c0:ee".to_vec());
        assert!(matches!(state.merge(&[msg]).skipped[0].1, MessageError::FieldShape(_)));
        assert!(state.document().is_empty());
    }

    #[test]
    fn test_deleted_key_is_reserved() {
        let mut state = profile();
        assert_eq!(
            state.set_field("-", Some(Value::from(1))),
            Err(FieldError::Reserved("-".to_string()))
        );
    }

    #[test]
    fn test_take_push_once() {
        let mut state = profile();
        assert!(state.take_push().is_none());
        state.merge(&[name_msg("h1", 100, "alice")]);
        assert_eq!(state.take_push().unwrap(), b"d1:n5:alicee".to_vec());
        assert!(state.take_push().is_none());
    }
}
