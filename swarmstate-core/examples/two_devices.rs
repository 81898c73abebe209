//! Two devices of one account syncing a profile through a simulated swarm
//!
//! Run with:
//! ```bash
//! cargo run --example two_devices
//! ```

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use swarmstate_core::core_codec::Value;
use swarmstate_core::core_config::{ConfigMessage, Namespace};
use swarmstate_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use swarmstate_core::{EngineConfig, StateStore};
use tracing::info;

type Swarm = Arc<Mutex<Vec<ConfigMessage>>>;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Device whose pushes land in the shared swarm
fn device(name: &'static str, seed: &[u8; 32], swarm: Swarm) -> anyhow::Result<StateStore> {
    let mut store = StateStore::new(seed, EngineConfig::default())?;
    store.set_logger(Some(Box::new(move |level: LogLevel, msg: &str| {
        println!("[{}] {}: {}", name, level, msg);
    })));

    let mut counter = 0;
    store.set_send_callback(Some(Box::new(move |_: &str, payload: &[u8]| -> anyhow::Result<()> {
        for (key, data) in Value::decode(payload)?.into_dict()? {
            let Some(namespace) = Namespace::ALL.into_iter().find(|ns| ns.name().as_bytes() == key) else {
                continue;
            };
            counter += 1;
            let data = data.as_bytes().unwrap_or_default().to_vec();
            let msg = ConfigMessage::new(namespace, format!("{}-{}", name, counter), now_ms() + 1, data);
            info!(device = name, hash = %msg.hash, namespace = %namespace, "pushed to swarm");
            swarm.lock().map_err(|_| anyhow::anyhow!("swarm poisoned"))?.push(msg);
        }
        Ok(())
    })));
    Ok(store)
}

fn main() -> anyhow::Result<()> {
    init_logging_with_config(LogConfig::new(LogLevel::Debug).with_target(false))?;

    let swarm: Swarm = Arc::default();
    let seed = [0x2a; 32];
    let mut phone = device("phone", &seed, swarm.clone())?;
    let mut laptop = device("laptop", &seed, swarm.clone())?;
    let account = phone.account_id().to_string();

    phone.set_profile_name(Some("Alice"))?;
    laptop.set_nts_priority(1)?;

    let fetched = swarm.lock().map_err(|_| anyhow::anyhow!("swarm poisoned"))?.clone();
    info!(messages = fetched.len(), "fetched from swarm");
    phone.merge(&account, &fetched)?;
    laptop.merge(&account, &fetched)?;

    for (name, store) in [("phone", &phone), ("laptop", &laptop)] {
        info!(
            device = name,
            profile_name = ?store.profile_name(),
            nts_priority = store.nts_priority(),
            "converged profile"
        );
    }
    Ok(())
}
