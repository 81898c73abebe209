/*
    core_config - Mergeable config objects

    One ConfigState per (namespace, account) pair folds swarm messages into a
    ConfigDocument with last-writer-wins fields, tracks applied hashes and the
    dirty flag, and round-trips through the binary dump format.
*/

pub mod document;
pub mod errors;
pub mod message;
pub mod namespace;
pub mod profile;
pub mod schema;
pub mod state;

#[cfg(test)]
mod tests;

pub use document::{ConfigDocument, Field, FieldState};
pub use errors::{DumpError, FieldError, MessageError};
pub use message::{ConfigMessage, Priority};
pub use namespace::{Namespace, UnknownNamespace};
pub use profile::ProfilePic;
pub use schema::{ConfigKind, FieldRule};
pub use state::{ConfigState, MergeReport, DUMP_FORMAT_VERSION};
