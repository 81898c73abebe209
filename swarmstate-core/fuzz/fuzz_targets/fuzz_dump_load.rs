#![no_main]

use libfuzzer_sys::fuzz_target;
use swarmstate_core::core_config::{ConfigKind, ConfigState};
use swarmstate_core::core_identity::{AccountId, PREFIX_USER};
use swarmstate_core::{EngineConfig, StateStore};

fuzz_target!(|data: &[u8]| {
    let mut config = EngineConfig::default();
    // Keep hostile compressed input cheap
    config.limits.max_dump_size = 1024 * 1024;

    // Single-state dump: a loaded state must dump to something loadable.
    // Raw re-dumps keep the check independent of the size limit.
    let mut raw = config.clone();
    raw.compression.enabled = false;
    let account = AccountId::new(PREFIX_USER, [1; 32]);
    if let Ok(mut state) = ConfigState::from_dump(ConfigKind::UserProfile, account, &raw, data) {
        let again = state.dump();
        let reloaded = ConfigState::from_dump(ConfigKind::UserProfile, account, &raw, &again)
            .expect("re-dumped state must load");
        assert_eq!(reloaded.document(), state.document());
    }

    // Container dump
    if let Ok(mut store) = StateStore::new(&[2; 32], config) {
        let _ = store.load_dump(data);
        let _ = store.dump(true);
    }
});
