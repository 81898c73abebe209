//! Boundary surface
//!
//! Flat functions over a [`StateStore`] for embedders that need a stable,
//! error-code style interface. Every failure becomes a [`BoundaryError`]
//! carrying the error kind and a message of at most
//! [`MAX_ERROR_MESSAGE_LEN`] bytes.

use super::errors::{ErrorKind, StateError};
use super::hooks::{LoggerHook, SendHook};
use super::store::StateStore;
use crate::config::EngineConfig;
use crate::core_config::{ConfigMessage, Namespace, ProfilePic};
use thiserror::Error;

pub const MAX_ERROR_MESSAGE_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BoundaryError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<StateError> for BoundaryError {
    fn from(err: StateError) -> Self {
        BoundaryError {
            kind: err.kind(),
            message: truncate_message(err.to_string()),
        }
    }
}

pub type BoundaryResult<T> = Result<T, BoundaryError>;

/// Cut `message` to the longest prefix within the limit that ends on a
/// char boundary
pub fn truncate_message(mut message: String) -> String {
    if message.len() > MAX_ERROR_MESSAGE_LEN {
        let mut end = MAX_ERROR_MESSAGE_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

/// New store from a seed, or with a random identity when `seed` is None
pub fn create(seed: Option<&[u8]>) -> BoundaryResult<StateStore> {
    create_with_config(seed, EngineConfig::default())
}

pub fn create_with_config(seed: Option<&[u8]>, config: EngineConfig) -> BoundaryResult<StateStore> {
    match seed {
        Some(seed) => Ok(StateStore::new(seed, config)?),
        None => Ok(StateStore::random(config)),
    }
}

pub fn load(store: &mut StateStore, namespace: Namespace, account: &str, dump: &[u8]) -> BoundaryResult<()> {
    Ok(store.load(namespace, account, dump)?)
}

pub fn merge(store: &mut StateStore, account: &str, messages: &[ConfigMessage]) -> BoundaryResult<Vec<String>> {
    Ok(store.merge(account, messages)?)
}

pub fn dump(store: &mut StateStore, full: bool) -> Vec<u8> {
    store.dump(full)
}

pub fn dump_namespace(store: &mut StateStore, namespace: Namespace, account: &str) -> BoundaryResult<Vec<u8>> {
    Ok(store.dump_namespace(namespace, account)?)
}

pub fn set_send_callback(store: &mut StateStore, hook: Option<SendHook>) {
    store.set_send_callback(hook);
}

pub fn set_logger(store: &mut StateStore, logger: Option<LoggerHook>) {
    store.set_logger(logger);
}

pub fn get_profile_name(store: &StateStore) -> Option<String> {
    store.profile_name().map(str::to_string)
}

pub fn set_profile_name(store: &mut StateStore, name: Option<&str>) -> BoundaryResult<()> {
    store.set_profile_name(name)?;
    Ok(())
}

pub fn get_profile_pic(store: &StateStore) -> Option<ProfilePic> {
    store.profile_pic()
}

pub fn set_profile_pic(store: &mut StateStore, pic: Option<&ProfilePic>) -> BoundaryResult<()> {
    store.set_profile_pic(pic)?;
    Ok(())
}

pub fn get_blinded_msgreqs(store: &StateStore) -> i32 {
    store.blinded_msgreqs()
}

pub fn set_blinded_msgreqs(store: &mut StateStore, value: i32) -> BoundaryResult<()> {
    store.set_blinded_msgreqs(value)?;
    Ok(())
}
