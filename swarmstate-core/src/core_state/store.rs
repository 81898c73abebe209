/*
    store.rs - StateStore: every config the local device tracks

    Owns one ConfigState per (namespace, account) pair:
    - the four user namespaces of the store's own account always exist
    - group states (and states of other user accounts) are created lazily
      by merge, load or a local write
    - after a change, dirty states are handed to the store hook and
      updated push fragments to the send hook, unless suppressed

    Single-threaded by contract; callers needing shared access wrap the
    store in their own lock.
*/

use super::dump::{build_container, parse_container, DumpEntry};
use super::errors::{StateError, StateResult};
use super::hooks::{Diagnostics, LoggerHook, SendHook, StoreHook, Suppressions};
use crate::config::EngineConfig;
use crate::core_codec::{encode, Dict, Value};
use crate::core_config::state::now_ms;
use crate::core_config::{ConfigKind, ConfigMessage, ConfigState, FieldError, Namespace, ProfilePic};
use crate::core_identity::{AccountId, IdentityKeypair};
use crate::logging::LogLevel;
use crate::metrics;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub struct StateStore {
    keypair: IdentityKeypair,
    account: AccountId,
    config: EngineConfig,
    states: BTreeMap<(Namespace, AccountId), ConfigState>,
    diagnostics: Diagnostics,
    send_hook: Option<SendHook>,
    store_hook: Option<StoreHook>,
    suppressions: Suppressions,
}

impl StateStore {
    /// Store for the identity behind a 32-byte seed (or 64-byte secret key)
    pub fn new(seed: &[u8], config: EngineConfig) -> StateResult<Self> {
        Ok(Self::with_keypair(IdentityKeypair::from_secret(seed)?, config))
    }

    /// Store with a freshly generated identity
    pub fn random(config: EngineConfig) -> Self {
        Self::with_keypair(IdentityKeypair::generate(), config)
    }

    /// Store rehydrated from a container dump. Fails without side effects if
    /// any part of the dump is invalid.
    pub fn with_dumps(seed: &[u8], dumps: &[u8], config: EngineConfig) -> StateResult<Self> {
        let mut store = Self::new(seed, config)?;
        store.load_dump(dumps)?;
        Ok(store)
    }

    pub fn with_keypair(keypair: IdentityKeypair, config: EngineConfig) -> Self {
        let account = keypair.account_id();
        let mut states = BTreeMap::new();
        for namespace in Namespace::USER {
            if let Some(kind) = ConfigKind::for_namespace(namespace) {
                states.insert((namespace, account), ConfigState::new(kind, account, &config));
            }
        }
        tracing::debug!(account = %account, "created state store");

        StateStore {
            keypair,
            account,
            config,
            states,
            diagnostics: Diagnostics::default(),
            send_hook: None,
            store_hook: None,
            suppressions: Suppressions::default(),
        }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account
    }

    pub fn keypair(&self) -> &IdentityKeypair {
        &self.keypair
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every account with at least one state, own account included
    pub fn accounts(&self) -> BTreeSet<AccountId> {
        self.states.keys().map(|(_, account)| *account).collect()
    }

    pub fn state(&self, namespace: Namespace, account: &AccountId) -> Option<&ConfigState> {
        self.states.get(&(namespace, *account))
    }

    /// Whether any state has changes not yet dumped
    pub fn needs_dump(&self) -> bool {
        self.states.values().any(ConfigState::needs_dump)
    }

    /// Hashes of the messages still contributing to the account's configs
    pub fn current_hashes(&self, account: &str) -> StateResult<BTreeSet<String>> {
        let account = parse_account(account)?;
        Ok(self
            .states
            .iter()
            .filter(|((_, owner), _)| *owner == account)
            .flat_map(|(_, state)| state.current_hashes())
            .collect())
    }

    /// Fold swarm messages into the account's configs.
    ///
    /// Returns newly applied hashes in input order. Messages that cannot be
    /// applied are reported to the logger and left out.
    pub fn merge(&mut self, account: &str, messages: &[ConfigMessage]) -> StateResult<Vec<String>> {
        let account = parse_account(account)?;

        let mut batches: BTreeMap<(u8, Namespace), Vec<&ConfigMessage>> = BTreeMap::new();
        for msg in messages {
            batches
                .entry((msg.namespace.merge_order(), msg.namespace))
                .or_default()
                .push(msg);
        }

        let mut accepted = HashSet::new();
        for ((_, namespace), batch) in batches {
            let Some(kind) = ConfigKind::for_namespace(namespace) else {
                self.skip_batch(namespace, &account, batch.len(), "namespace holds no config");
                continue;
            };
            if namespace.expected_prefix() != account.prefix() {
                self.skip_batch(namespace, &account, batch.len(), "account prefix does not match namespace");
                continue;
            }

            let key = (namespace, account);
            let created = !self.states.contains_key(&key);
            let state = self
                .states
                .entry(key)
                .or_insert_with(|| ConfigState::new(kind, account, &self.config));
            let report = state.merge(batch.iter().copied());

            if created && report.accepted.is_empty() {
                self.states.remove(&key);
            }
            for (hash, source) in report.skipped {
                let err = StateError::DecodeFailure { hash, source };
                self.diagnostics
                    .warn(&format!("{} for {}: {}", namespace, account, err));
            }
            accepted.extend(report.accepted);
        }

        let mut seen = HashSet::new();
        let accepted: Vec<String> = messages
            .iter()
            .filter(|msg| accepted.contains(&msg.hash) && seen.insert(msg.hash.as_str()))
            .map(|msg| msg.hash.clone())
            .collect();

        if !accepted.is_empty() {
            self.flush(Some(account));
        }
        Ok(accepted)
    }

    fn skip_batch(&mut self, namespace: Namespace, account: &AccountId, count: usize, reason: &str) {
        metrics::record_merge(namespace.name(), 0, 0, count);
        self.diagnostics.warn(&format!(
            "skipping {} message(s) in {} for {}: {}",
            count, namespace, account, reason
        ));
    }

    /// Container dump of every state (`full`) or only the dirty ones.
    /// Included states are marked clean.
    pub fn dump(&mut self, full: bool) -> Vec<u8> {
        let entries: Vec<DumpEntry> = self
            .states
            .iter_mut()
            .filter(|(_, state)| full || state.needs_dump())
            .map(|(&(namespace, account), state)| DumpEntry { namespace, account, dump: state.dump() })
            .collect();
        tracing::debug!(full, states = entries.len(), "dumped state store");
        build_container(&self.account, entries)
    }

    /// Single-state dump; marks that state clean
    pub fn dump_namespace(&mut self, namespace: Namespace, account: &str) -> StateResult<Vec<u8>> {
        let account = parse_account(account)?;
        self.states
            .get_mut(&(namespace, account))
            .map(ConfigState::dump)
            .ok_or_else(|| StateError::NotInitialized { namespace, account: account.to_string() })
    }

    /// Create or replace one state from a single-state dump. A replaced
    /// state keeps the hashes it has already applied.
    pub fn load(&mut self, namespace: Namespace, account: &str, dump: &[u8]) -> StateResult<()> {
        let account = parse_account(account)?;
        let loaded = self.decode_state(namespace, account, dump)?;
        self.install(loaded);
        Ok(())
    }

    /// Load a container produced by `dump`, full or incremental. Nothing is
    /// applied unless every entry decodes.
    pub fn load_dump(&mut self, dumps: &[u8]) -> StateResult<()> {
        let parsed = parse_container(&self.account, dumps)?;
        let loaded = parsed
            .entries
            .into_iter()
            .map(|entry| self.decode_state(entry.namespace, entry.account, &entry.dump))
            .collect::<StateResult<Vec<_>>>()?;

        for key in parsed.ignored {
            self.diagnostics
                .log(LogLevel::Info, &format!("ignoring unknown dump entry '{}'", key));
        }
        for state in loaded {
            self.install(state);
        }
        Ok(())
    }

    fn decode_state(&self, namespace: Namespace, account: AccountId, dump: &[u8]) -> StateResult<ConfigState> {
        let kind = self.kind_for(namespace, &account)?;
        Ok(ConfigState::from_dump(kind, account, &self.config, dump)?)
    }

    fn install(&mut self, loaded: ConfigState) {
        match self.states.entry((loaded.namespace(), *loaded.account())) {
            Entry::Occupied(mut slot) => slot.get_mut().absorb(loaded),
            Entry::Vacant(slot) => {
                slot.insert(loaded);
            }
        }
    }

    fn kind_for(&self, namespace: Namespace, account: &AccountId) -> StateResult<ConfigKind> {
        match ConfigKind::for_namespace(namespace) {
            Some(kind) if namespace.expected_prefix() == account.prefix() => Ok(kind),
            Some(_) => Err(StateError::AccountMismatch { namespace, account: account.to_string() }),
            None => Err(StateError::NotInitialized { namespace, account: account.to_string() }),
        }
    }

    // -- hooks --

    pub fn set_logger(&mut self, logger: Option<LoggerHook>) {
        self.diagnostics.set_logger(logger);
    }

    /// Install or clear the send hook; pending pushes are delivered at once
    pub fn set_send_callback(&mut self, hook: Option<SendHook>) {
        self.send_hook = hook;
        self.flush(None);
    }

    /// Install or clear the store hook; pending dumps are delivered at once
    pub fn set_store_callback(&mut self, hook: Option<StoreHook>) {
        self.store_hook = hook;
        self.flush(None);
    }

    /// Hold back hooks globally (`account` None) or for one account
    pub fn suppress_hooks_start(&mut self, send: bool, store: bool, account: Option<&str>) -> StateResult<()> {
        let account = account.map(parse_account).transpose()?;
        self.suppressions.start(send, store, account);
        Ok(())
    }

    /// Release suppressed hooks and deliver what was held back
    pub fn suppress_hooks_stop(&mut self, send: bool, store: bool, account: Option<&str>) -> StateResult<()> {
        let account = account.map(parse_account).transpose()?;
        self.suppressions.stop(send, store, account);
        self.flush(account);
        Ok(())
    }

    fn flush(&mut self, only: Option<AccountId>) {
        let StateStore { states, diagnostics, send_hook, store_hook, suppressions, .. } = self;
        let in_scope = |account: &AccountId| only.map_or(true, |a| a == *account);

        if let Some(hook) = store_hook.as_mut() {
            let now = now_ms();
            for ((namespace, account), state) in states.iter_mut() {
                if !in_scope(account) || !state.needs_dump() || suppressions.store_suppressed(account) {
                    continue;
                }
                let dump = state.dump();
                if let Err(e) = hook(*namespace, &account.to_string(), now, &dump) {
                    state.mark_needs_dump();
                    diagnostics.warn(&format!("store hook failed for {} of {}: {:#}", namespace, account, e));
                }
            }
        }

        if let Some(hook) = send_hook.as_mut() {
            let mut payloads: BTreeMap<AccountId, (Dict, Vec<Namespace>)> = BTreeMap::new();
            for ((namespace, account), state) in states.iter_mut() {
                if !in_scope(account) || suppressions.send_suppressed(account) {
                    continue;
                }
                if let Some(packed) = state.take_push() {
                    let (payload, included) = payloads.entry(*account).or_default();
                    payload.insert(namespace.name().as_bytes().to_vec(), Value::Bytes(packed));
                    included.push(*namespace);
                }
            }
            for (account, (payload, included)) in payloads {
                if let Err(e) = hook(&account.to_string(), &encode(&Value::Dict(payload))) {
                    diagnostics.warn(&format!("send hook failed for {}: {:#}", account, e));
                    for namespace in included {
                        if let Some(state) = states.get_mut(&(namespace, account)) {
                            state.mark_needs_push();
                        }
                    }
                }
            }
        }
    }

    // -- field access --

    pub fn get_field(&self, namespace: Namespace, account: &str, key: &str) -> StateResult<Option<Value>> {
        let account = parse_account(account)?;
        Ok(self
            .state(namespace, &account)
            .and_then(|state| state.get_field(key))
            .cloned())
    }

    pub fn set_field(&mut self, namespace: Namespace, account: &str, key: &str, value: Option<Value>) -> StateResult<bool> {
        let account = parse_account(account)?;
        self.update(namespace, account, |state| state.set_field(key, value))
    }

    pub fn get_entry(&self, namespace: Namespace, account: &str, key: &str, entry: &[u8]) -> StateResult<Option<Value>> {
        let account = parse_account(account)?;
        Ok(self
            .state(namespace, &account)
            .and_then(|state| state.get_entry(key, entry))
            .cloned())
    }

    pub fn set_entry(
        &mut self,
        namespace: Namespace,
        account: &str,
        key: &str,
        entry: &[u8],
        value: Option<Value>,
    ) -> StateResult<bool> {
        let account = parse_account(account)?;
        self.update(namespace, account, |state| state.set_entry(key, entry, value))
    }

    /// Apply a local write, creating the state if needed, then run hooks
    fn update<F>(&mut self, namespace: Namespace, account: AccountId, write: F) -> StateResult<bool>
    where
        F: FnOnce(&mut ConfigState) -> Result<bool, FieldError>,
    {
        let kind = self.kind_for(namespace, &account)?;
        let state = self
            .states
            .entry((namespace, account))
            .or_insert_with(|| ConfigState::new(kind, account, &self.config));
        let changed = write(state)?;
        if changed {
            self.flush(Some(account));
        }
        Ok(changed)
    }

    // -- own profile --

    fn profile(&self) -> Option<&ConfigState> {
        self.state(Namespace::UserProfile, &self.account)
    }

    fn update_profile<F>(&mut self, write: F) -> StateResult<bool>
    where
        F: FnOnce(&mut ConfigState) -> Result<bool, FieldError>,
    {
        self.update(Namespace::UserProfile, self.account, write)
    }

    pub fn profile_name(&self) -> Option<&str> {
        self.profile().and_then(ConfigState::profile_name)
    }

    pub fn set_profile_name(&mut self, name: Option<&str>) -> StateResult<bool> {
        self.update_profile(|state| state.set_profile_name(name))
    }

    pub fn profile_pic(&self) -> Option<ProfilePic> {
        self.profile().and_then(ConfigState::profile_pic)
    }

    pub fn set_profile_pic(&mut self, pic: Option<&ProfilePic>) -> StateResult<bool> {
        self.update_profile(|state| state.set_profile_pic(pic))
    }

    /// -1 unset, 0 disabled, 1 enabled
    pub fn blinded_msgreqs(&self) -> i32 {
        self.profile().map_or(-1, ConfigState::blinded_msgreqs)
    }

    pub fn set_blinded_msgreqs(&mut self, value: i32) -> StateResult<bool> {
        self.update_profile(|state| state.set_blinded_msgreqs(value))
    }

    pub fn nts_priority(&self) -> i64 {
        self.profile().map_or(0, ConfigState::nts_priority)
    }

    pub fn set_nts_priority(&mut self, priority: i64) -> StateResult<bool> {
        self.update_profile(|state| state.set_nts_priority(priority))
    }

    pub fn nts_expiry(&self) -> Option<i64> {
        self.profile().and_then(ConfigState::nts_expiry)
    }

    pub fn set_nts_expiry(&mut self, seconds: i64) -> StateResult<bool> {
        self.update_profile(|state| state.set_nts_expiry(seconds))
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("account", &self.account.to_string())
            .field("states", &self.states.len())
            .finish_non_exhaustive()
    }
}

fn parse_account(text: &str) -> StateResult<AccountId> {
    Ok(text.parse::<AccountId>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_identity::PREFIX_GROUP;
    use crate::core_state::ErrorKind;
    use std::sync::{Arc, Mutex};

    const SEED: [u8; 32] = [7; 32];

    fn store() -> StateStore {
        StateStore::new(&SEED, EngineConfig::default()).unwrap()
    }

    fn group() -> String {
        AccountId::new(PREFIX_GROUP, [9; 32]).to_string()
    }

    fn fragment(key: &str, value: Value) -> Vec<u8> {
        let mut d = Dict::new();
        d.insert(key.as_bytes().to_vec(), value);
        encode(&Value::Dict(d))
    }

    fn name_msg(hash: &str, ts: i64, name: &str) -> ConfigMessage {
        ConfigMessage::new(Namespace::UserProfile, hash, ts, fragment("n", Value::text(name)))
    }

    #[test]
    fn test_user_namespaces_exist() {
        let store = store();
        let own = *store.account_id();
        for namespace in Namespace::USER {
            assert!(store.state(namespace, &own).is_some());
        }
        assert_eq!(store.accounts().len(), 1);
        assert!(!store.needs_dump());
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = store();
        let b = store();
        assert_eq!(a.account_id(), b.account_id());
        assert!(a.account_id().is_user());

        let err = StateStore::new(&[1, 2, 3], EngineConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentity);
    }

    #[test]
    fn test_merge_returns_input_order() {
        let mut store = store();
        let own = store.account_id().to_string();
        let contact = ConfigMessage::new(
            Namespace::ConvoInfoVolatile,
            "a",
            10,
            fragment("1", Value::Dict(Dict::new())),
        );
        let accepted = store
            .merge(&own, &[contact, name_msg("b", 10, "x"), name_msg("b", 10, "x")])
            .unwrap();
        assert_eq!(accepted, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_merge_rejects_bad_account() {
        let mut store = store();
        let err = store.merge("nope", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentity);
    }

    #[test]
    fn test_group_state_created_lazily() {
        let mut store = store();
        let group = group();
        let msg = ConfigMessage::new(Namespace::GroupInfo, "g1", 5, fragment("n", Value::text("team")));
        assert_eq!(store.merge(&group, &[msg]).unwrap(), vec!["g1".to_string()]);
        assert_eq!(
            store.get_field(Namespace::GroupInfo, &group, "n").unwrap(),
            Some(Value::text("team"))
        );
        assert_eq!(store.accounts().len(), 2);
    }

    #[test]
    fn test_failed_merge_leaves_no_state() {
        let mut store = store();
        let group = group();
        let bad = ConfigMessage::new(Namespace::GroupInfo, "g1", 5, b"x".to_vec());
        assert!(store.merge(&group, &[bad]).unwrap().is_empty());
        assert_eq!(store.accounts().len(), 1);
    }

    #[test]
    fn test_mismatched_namespace_skipped() {
        let mut store = store();
        let own = store.account_id().to_string();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.set_logger(Some(Box::new(move |_: LogLevel, msg: &str| {
            sink.lock().unwrap().push(msg.to_string())
        })));

        let msg = ConfigMessage::new(Namespace::GroupInfo, "g1", 5, fragment("n", Value::text("x")));
        let other = ConfigMessage::new(Namespace::GroupMessages, "m1", 5, b"de".to_vec());
        assert!(store.merge(&own, &[msg, other]).unwrap().is_empty());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_dump_namespace_not_initialized() {
        let mut store = store();
        let err = store.dump_namespace(Namespace::GroupKeys, &group()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotInitialized);
    }

    #[test]
    fn test_incremental_dump_only_dirty() {
        let mut store = store();
        let own = store.account_id().to_string();
        store.merge(&own, &[name_msg("h1", 100, "alice")]).unwrap();
        assert!(store.needs_dump());

        let incremental = store.dump(false);
        assert!(!store.needs_dump());
        let parsed = parse_container(store.account_id(), &incremental).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].namespace, Namespace::UserProfile);

        let again_bytes = store.dump(false);
        let again = parse_container(store.account_id(), &again_bytes).unwrap();
        assert!(again.entries.is_empty());
        let full_bytes = store.dump(true);
        let full = parse_container(store.account_id(), &full_bytes).unwrap();
        assert_eq!(full.entries.len(), 4);
    }

    #[test]
    fn test_load_dump_is_all_or_nothing() {
        let mut source = store();
        let own = source.account_id().to_string();
        source.merge(&own, &[name_msg("h1", 100, "alice")]).unwrap();
        let good = source.dump_namespace(Namespace::UserProfile, &own).unwrap();

        let mut top = Dict::new();
        top.insert(b"contacts".to_vec(), Value::from(b"garbage".to_vec()));
        top.insert(b"user_profile".to_vec(), Value::Bytes(good));
        let container = encode(&Value::Dict(top));

        let mut target = store();
        assert!(target.load_dump(&container).is_err());
        assert_eq!(target.profile_name(), None);
        assert!(StateStore::with_dumps(&SEED, &container, EngineConfig::default()).is_err());
    }

    #[test]
    fn test_load_replaces_state_and_keeps_hashes() {
        let mut store = store();
        let own = store.account_id().to_string();
        store.merge(&own, &[name_msg("h1", 100, "alice")]).unwrap();
        let dump = store.dump_namespace(Namespace::UserProfile, &own).unwrap();

        store.set_profile_name(Some("bob")).unwrap();
        store.load(Namespace::UserProfile, &own, &dump).unwrap();
        assert_eq!(store.profile_name(), Some("alice"));
        assert!(store.state(Namespace::UserProfile, store.account_id()).unwrap().has_applied("h1"));
    }

    #[test]
    fn test_load_rejects_wrong_prefix() {
        let mut store = store();
        let own = store.account_id().to_string();
        let err = store.load(Namespace::GroupInfo, &own, b"de").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentity);
    }

    #[test]
    fn test_current_hashes() {
        let mut store = store();
        let own = store.account_id().to_string();
        store
            .merge(&own, &[name_msg("h1", 100, "alice"), name_msg("h2", 200, "bob")])
            .unwrap();
        let hashes = store.current_hashes(&own).unwrap();
        assert_eq!(hashes.into_iter().collect::<Vec<_>>(), vec!["h2".to_string()]);
    }

    #[test]
    fn test_store_hook_receives_dirty_dumps() {
        let mut store = store();
        let own = store.account_id().to_string();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        store.set_store_callback(Some(Box::new(
            move |ns: Namespace, account: &str, _ts: i64, dump: &[u8]| -> anyhow::Result<()> {
                sink.lock().unwrap().push((ns, account.to_string(), dump.to_vec()));
                Ok(())
            },
        )));
        assert!(calls.lock().unwrap().is_empty());

        store.merge(&own, &[name_msg("h1", 100, "alice")]).unwrap();
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Namespace::UserProfile);
        assert_eq!(calls[0].1, own);
        assert!(!store.needs_dump());
    }

    #[test]
    fn test_failing_store_hook_keeps_state_dirty() {
        let mut store = store();
        store.set_store_callback(Some(Box::new(
            |_: Namespace, _: &str, _: i64, _: &[u8]| -> anyhow::Result<()> { anyhow::bail!("disk full") },
        )));
        store.set_profile_name(Some("alice")).unwrap();
        assert!(store.needs_dump());
    }

    #[test]
    fn test_send_hook_payload() {
        let mut store = store();
        let own = store.account_id().to_string();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = sent.clone();
        store.set_send_callback(Some(Box::new(move |account: &str, payload: &[u8]| -> anyhow::Result<()> {
            sink.lock().unwrap().push((account.to_string(), payload.to_vec()));
            Ok(())
        })));

        store.merge(&own, &[name_msg("h1", 100, "alice")]).unwrap();
        store.merge(&own, &[name_msg("h1", 100, "alice")]).unwrap();
        // new hash, same value: accepted and dirty, nothing to push
        assert_eq!(store.merge(&own, &[name_msg("h2", 200, "alice")]).unwrap(), vec!["h2".to_string()]);
        assert!(store.needs_dump());

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, own);
        assert_eq!(sent[0].1, b"d12:user_profile12:d1:n5:aliceee".to_vec());
    }

    #[test]
    fn test_suppression_batches_hooks() {
        let mut store = store();
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        store.set_send_callback(Some(Box::new(move |_: &str, _: &[u8]| -> anyhow::Result<()> {
            *sink.lock().unwrap() += 1;
            Ok(())
        })));

        store.suppress_hooks_start(true, false, None).unwrap();
        store.set_profile_name(Some("a")).unwrap();
        store.set_blinded_msgreqs(1).unwrap();
        assert_eq!(*count.lock().unwrap(), 0);

        store.suppress_hooks_stop(true, false, None).unwrap();
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_generic_entry_access() {
        let mut store = store();
        let own = store.account_id().to_string();
        assert!(store
            .set_entry(Namespace::Contacts, &own, "c", b"bob", Some(Value::text("friend")))
            .unwrap());
        assert_eq!(
            store.get_entry(Namespace::Contacts, &own, "c", b"bob").unwrap(),
            Some(Value::text("friend"))
        );
        let err = store
            .set_field(Namespace::Contacts, &own, "c", Some(Value::from(1)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidField);
    }
}
