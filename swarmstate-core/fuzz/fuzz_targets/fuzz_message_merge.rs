#![no_main]

use libfuzzer_sys::fuzz_target;
use swarmstate_core::core_config::{ConfigMessage, Namespace};
use swarmstate_core::{EngineConfig, StateStore};

fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }
    // First byte picks the namespace, the next eight the timestamp
    let namespace = Namespace::ALL[data[0] as usize % Namespace::ALL.len()];
    let mut ts = [0u8; 8];
    ts.copy_from_slice(&data[1..9]);
    let msg = ConfigMessage::new(namespace, "fuzz", i64::from_le_bytes(ts), data[9..].to_vec());

    let mut store = match StateStore::new(&[3; 32], EngineConfig::default()) {
        Ok(store) => store,
        Err(_) => return,
    };
    let me = store.account_id().to_string();
    // Merging arbitrary payloads never fails the batch
    store.merge(&me, &[msg]).expect("merge reports per-message failures only");
    let _ = store.dump(true);
});
