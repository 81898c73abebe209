/*
    document.rs - Mergeable config document

    Every field slot is a last-writer-wins register: a value (or tombstone)
    plus the priority of the write that produced it. Slots live in one of:
    - fields: keys the config kind recognises, merged per their FieldRule
    - unknown: keys from messages this build does not recognise
    - foreign: dump entries recognised by a newer writer, kept verbatim

    Dump layout of a slot: [timestamp, hash, value], or [timestamp, hash]
    for a tombstone.

    Fragment layout: live values under their keys, keyed fields as dicts of
    their live entries, and tombstones under the reserved "-" key:
        "-" => { register_key: "", keyed_key: { entry: "" } }
*/

use super::errors::DumpError;
use super::message::Priority;
use super::schema::{ConfigKind, FieldRule};
use crate::core_codec::{Dict, RawValue, Unknowns, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Fragment key holding cleared registers and removed entries
pub const DELETED_KEY: &[u8] = b"-";

/// One last-writer-wins slot. A `None` value is a tombstone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    value: Option<Value>,
    priority: Priority,
}

impl Field {
    pub fn new(value: Option<Value>, priority: Priority) -> Self {
        Field { value, priority }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn priority(&self) -> &Priority {
        &self.priority
    }

    /// Take `value` if `priority` is strictly higher than the current one.
    /// Returns whether the live value changed.
    pub fn offer(&mut self, value: Option<Value>, priority: &Priority) -> bool {
        if *priority <= self.priority {
            return false;
        }
        let changed = self.value != value;
        self.value = value;
        self.priority = priority.clone();
        changed
    }

    fn to_entry(&self) -> Value {
        let mut entry = vec![
            Value::Int(self.priority.timestamp_ms),
            Value::text(self.priority.hash.clone()),
        ];
        if let Some(value) = &self.value {
            entry.push(value.clone());
        }
        Value::List(entry)
    }

    fn from_entry(entry: Value) -> Result<Self, DumpError> {
        let mut items = entry.into_list()?.into_iter();
        let (ts, hash, value) = (items.next(), items.next(), items.next());
        if items.next().is_some() {
            return Err(DumpError::Malformed("field entry has more than 3 items".to_string()));
        }
        let timestamp_ms = ts
            .and_then(|v| v.as_int())
            .ok_or_else(|| DumpError::Malformed("field entry without timestamp".to_string()))?;
        let hash = match hash {
            Some(Value::Bytes(b)) => String::from_utf8(b)
                .map_err(|_| DumpError::Malformed("field hash is not UTF-8".to_string()))?,
            _ => return Err(DumpError::Malformed("field entry without hash".to_string())),
        };
        Ok(Field::new(value, Priority::new(timestamp_ms, hash)))
    }
}

fn offer_slot(slots: &mut BTreeMap<Vec<u8>, Field>, key: &[u8], value: Option<Value>, priority: &Priority) -> bool {
    match slots.get_mut(key) {
        Some(field) => field.offer(value, priority),
        None => {
            let changed = value.is_some();
            slots.insert(key.to_vec(), Field::new(value, priority.clone()));
            changed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    Register(Field),
    Keyed(BTreeMap<Vec<u8>, Field>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    fields: BTreeMap<Vec<u8>, FieldState>,
    unknown: BTreeMap<Vec<u8>, Field>,
    foreign: Unknowns,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.unknown.is_empty() && self.foreign.is_empty()
    }

    /// Register slot for `key`, recognised or unknown
    pub fn register(&self, key: &[u8]) -> Option<&Field> {
        match self.fields.get(key) {
            Some(FieldState::Register(field)) => Some(field),
            Some(FieldState::Keyed(_)) => None,
            None => self.unknown.get(key),
        }
    }

    pub fn entry(&self, key: &[u8], entry: &[u8]) -> Option<&Field> {
        match self.fields.get(key) {
            Some(FieldState::Keyed(entries)) => entries.get(entry),
            _ => None,
        }
    }

    /// Live entries of a keyed field
    pub fn entries(&self, key: &[u8]) -> impl Iterator<Item = (&[u8], &Value)> {
        let entries = match self.fields.get(key) {
            Some(FieldState::Keyed(entries)) => Some(entries),
            _ => None,
        };
        entries
            .into_iter()
            .flatten()
            .filter_map(|(k, f)| f.value().map(|v| (k.as_slice(), v)))
    }

    /// Unknown slots, for inspection
    pub fn unknown(&self) -> &BTreeMap<Vec<u8>, Field> {
        &self.unknown
    }

    /// Write a register slot. `key` must not be a keyed field of `kind`.
    /// Returns whether the live value changed.
    pub fn put_register(&mut self, kind: ConfigKind, key: &[u8], value: Option<Value>, priority: &Priority) -> bool {
        match kind.rule(key) {
            Some(FieldRule::Register) => match self.fields.get_mut(key) {
                Some(FieldState::Register(field)) => field.offer(value, priority),
                Some(FieldState::Keyed(_)) => false,
                None => {
                    let changed = value.is_some();
                    self.fields.insert(
                        key.to_vec(),
                        FieldState::Register(Field::new(value, priority.clone())),
                    );
                    changed
                }
            },
            Some(FieldRule::Keyed) => false,
            None => offer_slot(&mut self.unknown, key, value, priority),
        }
    }

    /// Write one entry of a keyed field
    pub fn put_entry(&mut self, key: &[u8], entry: &[u8], value: Option<Value>, priority: &Priority) -> bool {
        let state = self
            .fields
            .entry(key.to_vec())
            .or_insert_with(|| FieldState::Keyed(BTreeMap::new()));
        match state {
            FieldState::Keyed(entries) => offer_slot(entries, entry, value, priority),
            FieldState::Register(_) => false,
        }
    }

    /// Fold a validated message fragment in at `priority`, tombstones
    /// included. Keyed fields are expected to be dicts already; anything
    /// else is ignored. Returns whether any live value changed.
    pub fn apply_fragment(&mut self, kind: ConfigKind, mut fragment: Dict, priority: &Priority) -> bool {
        let deleted = fragment.remove(DELETED_KEY);
        let mut changed = false;
        for (key, value) in fragment {
            match (kind.rule(&key), value) {
                (Some(FieldRule::Keyed), Value::Dict(entries)) => {
                    for (entry, v) in entries {
                        changed |= self.put_entry(&key, &entry, Some(v), priority);
                    }
                }
                (Some(FieldRule::Keyed), _) => {}
                (_, value) => changed |= self.put_register(kind, &key, Some(value), priority),
            }
        }
        if let Some(Value::Dict(deleted)) = deleted {
            for (key, value) in deleted {
                match (kind.rule(&key), value) {
                    (Some(FieldRule::Keyed), Value::Dict(entries)) => {
                        for entry in entries.into_keys() {
                            changed |= self.put_entry(&key, &entry, None, priority);
                        }
                    }
                    (Some(FieldRule::Keyed), _) => {}
                    _ => changed |= self.put_register(kind, &key, None, priority),
                }
            }
        }
        changed
    }

    /// Live values plus the "-" tombstone set: everything another device
    /// needs to reach the same live view
    pub fn fragment(&self) -> Dict {
        let mut out = self.live_fragment();
        let deleted = self.deleted_fragment();
        if !deleted.is_empty() {
            out.insert(DELETED_KEY.to_vec(), Value::Dict(deleted));
        }
        out
    }

    /// Tombstoned registers and entries, in the "-" layout
    fn deleted_fragment(&self) -> Dict {
        let mut out = Dict::new();
        for (key, slot) in &self.unknown {
            if slot.value().is_none() {
                out.insert(key.clone(), Value::Bytes(Vec::new()));
            }
        }
        for (key, state) in &self.fields {
            match state {
                FieldState::Register(field) => {
                    if field.value().is_none() {
                        out.insert(key.clone(), Value::Bytes(Vec::new()));
                    }
                }
                FieldState::Keyed(entries) => {
                    let gone: Dict = entries
                        .iter()
                        .filter(|(_, f)| f.value().is_none())
                        .map(|(k, _)| (k.clone(), Value::Bytes(Vec::new())))
                        .collect();
                    if !gone.is_empty() {
                        out.insert(key.clone(), Value::Dict(gone));
                    }
                }
            }
        }
        out
    }

    /// Live values only, tombstones dropped
    pub fn live_fragment(&self) -> Dict {
        let mut out = Dict::new();
        for (key, slot) in &self.unknown {
            if let Some(v) = slot.value() {
                out.insert(key.clone(), v.clone());
            }
        }
        for (key, state) in &self.fields {
            match state {
                FieldState::Register(field) => {
                    if let Some(v) = field.value() {
                        out.insert(key.clone(), v.clone());
                    }
                }
                FieldState::Keyed(entries) => {
                    let live: Dict = entries
                        .iter()
                        .filter_map(|(k, f)| f.value().map(|v| (k.clone(), v.clone())))
                        .collect();
                    if !live.is_empty() {
                        out.insert(key.clone(), Value::Dict(live));
                    }
                }
            }
        }
        out
    }

    /// Hashes of the messages whose writes are still in effect
    pub fn current_hashes(&self) -> BTreeSet<String> {
        let mut hashes = BTreeSet::new();
        let mut note = |field: &Field| {
            if !field.priority.hash.is_empty() {
                hashes.insert(field.priority.hash.clone());
            }
        };
        self.unknown.values().for_each(&mut note);
        for state in self.fields.values() {
            match state {
                FieldState::Register(field) => note(field),
                FieldState::Keyed(entries) => entries.values().for_each(&mut note),
            }
        }
        hashes
    }

    /// Largest timestamp written to any slot
    pub fn latest_timestamp(&self) -> Option<i64> {
        let mut latest = self.unknown.values().map(|f| f.priority.timestamp_ms).max();
        for state in self.fields.values() {
            let ts = match state {
                FieldState::Register(field) => Some(field.priority.timestamp_ms),
                FieldState::Keyed(entries) => entries.values().map(|f| f.priority.timestamp_ms).max(),
            };
            latest = latest.max(ts);
        }
        latest
    }

    /// `(recognised, unknown)` dump values
    pub fn to_dump_parts(&self) -> (Value, Value) {
        let mut recognised: Dict = self
            .foreign
            .iter()
            .filter_map(|(k, raw)| raw.decode().ok().map(|v| (k.clone(), v)))
            .collect();
        for (key, state) in &self.fields {
            let value = match state {
                FieldState::Register(field) => field.to_entry(),
                FieldState::Keyed(entries) => Value::Dict(
                    entries.iter().map(|(k, f)| (k.clone(), f.to_entry())).collect(),
                ),
            };
            recognised.insert(key.clone(), value);
        }
        let unknown: Dict = self
            .unknown
            .iter()
            .map(|(k, f)| (k.clone(), f.to_entry()))
            .collect();
        (Value::Dict(recognised), Value::Dict(unknown))
    }

    /// Rebuild from dump values.
    ///
    /// Entries of `recognised` this kind does not know are kept verbatim.
    /// Unknown slots this kind does recognise (written before it learned
    /// them) are promoted unless the recognised side already has the key.
    pub fn from_dump_parts(kind: ConfigKind, recognised: Dict, unknown: Dict) -> Result<Self, DumpError> {
        let mut doc = ConfigDocument::new();

        for (key, value) in recognised {
            match kind.rule(&key) {
                Some(FieldRule::Register) => {
                    doc.fields.insert(key, FieldState::Register(Field::from_entry(value)?));
                }
                Some(FieldRule::Keyed) => {
                    let entries = value
                        .into_dict()?
                        .into_iter()
                        .map(|(k, v)| Field::from_entry(v).map(|f| (k, f)))
                        .collect::<Result<_, _>>()?;
                    doc.fields.insert(key, FieldState::Keyed(entries));
                }
                None => {
                    doc.foreign.insert(key, RawValue::from_value(&value));
                }
            }
        }

        for (key, value) in unknown {
            let field = Field::from_entry(value)?;
            if doc.fields.contains_key(&key) {
                doc.unknown.insert(key, field);
                continue;
            }
            match (kind.rule(&key), field.value) {
                (Some(FieldRule::Register), value) => {
                    doc.fields.insert(key, FieldState::Register(Field::new(value, field.priority)));
                }
                (Some(FieldRule::Keyed), Some(Value::Dict(entries))) => {
                    let entries = entries
                        .into_iter()
                        .map(|(k, v)| (k, Field::new(Some(v), field.priority.clone())))
                        .collect();
                    doc.fields.insert(key, FieldState::Keyed(entries));
                }
                (_, value) => {
                    doc.unknown.insert(key, Field::new(value, field.priority));
                }
            }
        }

        Ok(doc)
    }
}
