/*
    hooks.rs - Injected callbacks and diagnostics

    Three optional hooks, all defaulting to no-op:
    - logger(level, message): every diagnostic, unfiltered
    - send(account, payload): namespace-name -> packed push fragment
    - store(namespace, account, timestamp_ms, dump): one dirty state's dump

    Hook failures are logged and swallowed; they never fail the operation
    that triggered them.
*/

use crate::core_config::Namespace;
use crate::core_identity::AccountId;
use crate::logging::LogLevel;
use std::collections::BTreeMap;

pub type LoggerHook = Box<dyn FnMut(LogLevel, &str) + Send>;
pub type SendHook = Box<dyn FnMut(&str, &[u8]) -> anyhow::Result<()> + Send>;
pub type StoreHook = Box<dyn FnMut(Namespace, &str, i64, &[u8]) -> anyhow::Result<()> + Send>;

/// Emits diagnostics to tracing and to the injected logger
#[derive(Default)]
pub struct Diagnostics {
    logger: Option<LoggerHook>,
}

impl Diagnostics {
    pub fn set_logger(&mut self, logger: Option<LoggerHook>) {
        self.logger = logger;
    }

    pub fn log(&mut self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "swarmstate", "{}", message),
            LogLevel::Debug => tracing::debug!(target: "swarmstate", "{}", message),
            LogLevel::Info => tracing::info!(target: "swarmstate", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "swarmstate", "{}", message),
            LogLevel::Error => tracing::error!(target: "swarmstate", "{}", message),
        }
        if let Some(logger) = self.logger.as_mut() {
            logger(level, message);
        }
    }

    pub fn warn(&mut self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn debug(&mut self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
}

/// Which hooks are held back
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Suppression {
    pub send: bool,
    pub store: bool,
}

/// Global and per-account hook suppression
#[derive(Debug, Default)]
pub struct Suppressions {
    global: Suppression,
    per_account: BTreeMap<AccountId, Suppression>,
}

impl Suppressions {
    pub fn start(&mut self, send: bool, store: bool, account: Option<AccountId>) {
        let slot = match account {
            Some(account) => self.per_account.entry(account).or_default(),
            None => &mut self.global,
        };
        slot.send |= send;
        slot.store |= store;
    }

    pub fn stop(&mut self, send: bool, store: bool, account: Option<AccountId>) {
        let slot = match account {
            Some(account) => self.per_account.entry(account).or_default(),
            None => &mut self.global,
        };
        slot.send &= !send;
        slot.store &= !store;
        if let Some(account) = account {
            if self.per_account.get(&account) == Some(&Suppression::default()) {
                self.per_account.remove(&account);
            }
        }
    }

    pub fn send_suppressed(&self, account: &AccountId) -> bool {
        self.global.send || self.per_account.get(account).is_some_and(|s| s.send)
    }

    pub fn store_suppressed(&self, account: &AccountId) -> bool {
        self.global.store || self.per_account.get(account).is_some_and(|s| s.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_identity::PREFIX_USER;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_logger_receives_every_level() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut diagnostics = Diagnostics::default();
        diagnostics.set_logger(Some(Box::new(move |level: LogLevel, msg: &str| {
            sink.lock().unwrap().push((level, msg.to_string()));
        })));

        diagnostics.log(LogLevel::Trace, "t");
        diagnostics.warn("w");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(LogLevel::Trace, "t".to_string()), (LogLevel::Warn, "w".to_string())]
        );

        diagnostics.set_logger(None);
        diagnostics.debug("dropped");
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_suppression_scopes() {
        let alice = AccountId::new(PREFIX_USER, [1; 32]);
        let bob = AccountId::new(PREFIX_USER, [2; 32]);
        let mut s = Suppressions::default();

        s.start(true, false, Some(alice));
        assert!(s.send_suppressed(&alice));
        assert!(!s.store_suppressed(&alice));
        assert!(!s.send_suppressed(&bob));

        s.start(false, true, None);
        assert!(s.store_suppressed(&bob));

        s.stop(true, true, Some(alice));
        s.stop(false, true, None);
        assert!(!s.send_suppressed(&alice));
        assert!(!s.store_suppressed(&bob));
    }
}
