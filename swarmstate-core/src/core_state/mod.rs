/*
    core_state - The state store and its boundary

    StateStore owns every ConfigState for the local identity, partitions
    incoming batches by namespace, persists through single-state or
    container dumps, and reports changes through injected hooks.
*/

pub mod api;
pub mod dump;
pub mod errors;
pub mod hooks;
pub mod store;

pub use api::{BoundaryError, BoundaryResult, MAX_ERROR_MESSAGE_LEN};
pub use dump::{DumpEntry, ParsedContainer};
pub use errors::{ErrorKind, StateError, StateResult};
pub use hooks::{Diagnostics, LoggerHook, SendHook, StoreHook, Suppression, Suppressions};
pub use store::StateStore;
