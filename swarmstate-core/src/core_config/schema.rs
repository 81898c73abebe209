/*
    schema.rs - Config kinds and their field merge rules

    One variant per config namespace. A kind only decides how each field
    it recognises is merged; it does not interpret field contents. Keys a
    kind does not list are kept in the document's unknown bucket.
*/

use super::namespace::Namespace;

/// How a recognised field merges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Whole value is last-writer-wins
    Register,
    /// Value is a dict; each entry is last-writer-wins on its own
    Keyed,
}

use FieldRule::{Keyed, Register};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    UserProfile,
    Contacts,
    ConvoInfoVolatile,
    UserGroups,
    GroupInfo,
    GroupMembers,
    GroupKeys,
}

impl ConfigKind {
    /// None for namespaces that carry no config
    pub fn for_namespace(namespace: Namespace) -> Option<Self> {
        match namespace {
            Namespace::UserProfile => Some(ConfigKind::UserProfile),
            Namespace::Contacts => Some(ConfigKind::Contacts),
            Namespace::ConvoInfoVolatile => Some(ConfigKind::ConvoInfoVolatile),
            Namespace::UserGroups => Some(ConfigKind::UserGroups),
            Namespace::GroupInfo => Some(ConfigKind::GroupInfo),
            Namespace::GroupMembers => Some(ConfigKind::GroupMembers),
            Namespace::GroupKeys => Some(ConfigKind::GroupKeys),
            Namespace::GroupMessages => None,
        }
    }

    pub fn namespace(self) -> Namespace {
        match self {
            ConfigKind::UserProfile => Namespace::UserProfile,
            ConfigKind::Contacts => Namespace::Contacts,
            ConfigKind::ConvoInfoVolatile => Namespace::ConvoInfoVolatile,
            ConfigKind::UserGroups => Namespace::UserGroups,
            ConfigKind::GroupInfo => Namespace::GroupInfo,
            ConfigKind::GroupMembers => Namespace::GroupMembers,
            ConfigKind::GroupKeys => Namespace::GroupKeys,
        }
    }

    /// Recognised fields, sorted by key
    pub fn fields(self) -> &'static [(&'static str, FieldRule)] {
        match self {
            // note-to-self priority, blinded msg requests, note-to-self expiry, name, pic url, pic key
            ConfigKind::UserProfile => &[
                ("+", Register),
                ("M", Register),
                ("e", Register),
                ("n", Register),
                ("p", Register),
                ("q", Register),
            ],
            ConfigKind::Contacts => &[("c", Keyed)],
            ConfigKind::ConvoInfoVolatile => &[("1", Keyed), ("C", Keyed), ("o", Keyed)],
            ConfigKind::UserGroups => &[("C", Keyed), ("g", Keyed), ("o", Keyed)],
            ConfigKind::GroupInfo => &[
                ("E", Register),
                ("c", Register),
                ("d", Register),
                ("n", Register),
                ("o", Register),
                ("p", Register),
                ("q", Register),
            ],
            ConfigKind::GroupMembers => &[("m", Keyed)],
            ConfigKind::GroupKeys => &[("K", Keyed), ("k", Register)],
        }
    }

    pub fn rule(self, key: &[u8]) -> Option<FieldRule> {
        self.fields()
            .iter()
            .find(|(k, _)| k.as_bytes() == key)
            .map(|(_, rule)| *rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_config_namespace_has_a_kind() {
        for ns in Namespace::ALL {
            match ConfigKind::for_namespace(ns) {
                Some(kind) => assert_eq!(kind.namespace(), ns),
                None => assert!(!ns.is_config()),
            }
        }
    }

    #[test]
    fn test_fields_are_sorted() {
        for ns in Namespace::ALL {
            if let Some(kind) = ConfigKind::for_namespace(ns) {
                let keys: Vec<_> = kind.fields().iter().map(|(k, _)| *k).collect();
                let mut sorted = keys.clone();
                sorted.sort();
                sorted.dedup();
                assert_eq!(keys, sorted, "{:?}", kind);
            }
        }
    }

    #[test]
    fn test_rules() {
        assert_eq!(ConfigKind::UserProfile.rule(b"n"), Some(FieldRule::Register));
        assert_eq!(ConfigKind::Contacts.rule(b"c"), Some(FieldRule::Keyed));
        assert_eq!(ConfigKind::GroupKeys.rule(b"k"), Some(FieldRule::Register));
        assert_eq!(ConfigKind::Contacts.rule(b"n"), None);
    }
}
