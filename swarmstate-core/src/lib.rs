//! Merge engine for a multi-device config store.
//!
//! Devices publish immutable, hash-identified config messages to an
//! untrusted swarm; every device folds whatever it fetches, in any order,
//! into the same per-namespace documents and persists them as compact dumps.

pub mod config;
pub mod core_codec;
pub mod core_config;
pub mod core_identity;
pub mod core_state;
pub mod logging;
pub mod metrics;

pub use config::EngineConfig;
pub use core_config::{ConfigMessage, Namespace};
pub use core_state::{StateError, StateStore};
pub use logging::{init_logging, LogLevel};
