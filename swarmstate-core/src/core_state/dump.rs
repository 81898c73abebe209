/*
    dump.rs - Multi-state container dump

    Layout (canonical dict):
        "<user namespace name>"  own account's single-state dump (bytes)
        "<66-hex account id>"    dict of namespace short name -> dump (bytes)

    Incremental dumps use the same layout with fewer entries, so one parser
    reads both.
*/

use super::errors::StateResult;
use crate::core_codec::{decode, encode, Dict, Value};
use crate::core_config::{DumpError, Namespace};
use crate::core_identity::AccountId;

/// One single-state dump inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpEntry {
    pub namespace: Namespace,
    pub account: AccountId,
    pub dump: Vec<u8>,
}

/// Container contents plus the keys that were not understood
#[derive(Debug, Default)]
pub struct ParsedContainer {
    pub entries: Vec<DumpEntry>,
    pub ignored: Vec<String>,
}

pub fn build_container(own: &AccountId, entries: Vec<DumpEntry>) -> Vec<u8> {
    let mut top = Dict::new();
    for entry in entries {
        let dump = Value::Bytes(entry.dump);
        if entry.account == *own && !entry.namespace.is_group() {
            top.insert(entry.namespace.name().as_bytes().to_vec(), dump);
            continue;
        }
        let nested = top
            .entry(entry.account.to_string().into_bytes())
            .or_insert_with(|| Value::Dict(Dict::new()));
        if let Value::Dict(nested) = nested {
            nested.insert(entry.namespace.short_name().as_bytes().to_vec(), dump);
        }
    }
    encode(&Value::Dict(top))
}

pub fn parse_container(own: &AccountId, bytes: &[u8]) -> StateResult<ParsedContainer> {
    let top = decode(bytes).and_then(Value::into_dict).map_err(DumpError::from)?;
    let mut parsed = ParsedContainer::default();

    for (key, value) in top {
        let key = String::from_utf8_lossy(&key).into_owned();

        if let Some(namespace) = Namespace::from_short_name(&key).filter(|ns| !ns.is_group()) {
            parsed.entries.push(DumpEntry {
                namespace,
                account: *own,
                dump: expect_bytes(&key, value)?,
            });
            continue;
        }

        let Ok(account) = key.parse::<AccountId>() else {
            parsed.ignored.push(key);
            continue;
        };
        let nested = value
            .into_dict()
            .map_err(|_| DumpError::Malformed(format!("entry for {} is not a dict", account)))?;
        for (name, value) in nested {
            let name = String::from_utf8_lossy(&name).into_owned();
            match Namespace::from_short_name(&name) {
                Some(namespace) if namespace.expected_prefix() == account.prefix() => {
                    parsed.entries.push(DumpEntry {
                        namespace,
                        account,
                        dump: expect_bytes(&name, value)?,
                    });
                }
                _ => parsed.ignored.push(format!("{}/{}", key, name)),
            }
        }
    }
    Ok(parsed)
}

fn expect_bytes(key: &str, value: Value) -> Result<Vec<u8>, DumpError> {
    match value {
        Value::Bytes(bytes) => Ok(bytes),
        other => Err(DumpError::Malformed(format!(
            "entry {} is a {}, expected bytes",
            key,
            other.type_name()
        ))),
    }
}
