/*
    namespace.rs - Config namespaces

    Numeric tags are fixed by the swarm protocol. User namespaces belong to
    0x05 accounts, group namespaces to 0x03 accounts.
*/

use crate::core_identity::{PREFIX_GROUP, PREFIX_USER};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown namespace {0}")]
pub struct UnknownNamespace(pub i16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum Namespace {
    UserProfile = 2,
    Contacts = 3,
    ConvoInfoVolatile = 4,
    UserGroups = 5,
    GroupMessages = 11,
    GroupKeys = 12,
    GroupInfo = 13,
    GroupMembers = 14,
}

impl Namespace {
    pub const ALL: [Namespace; 8] = [
        Namespace::UserProfile,
        Namespace::Contacts,
        Namespace::ConvoInfoVolatile,
        Namespace::UserGroups,
        Namespace::GroupMessages,
        Namespace::GroupKeys,
        Namespace::GroupInfo,
        Namespace::GroupMembers,
    ];

    /// Namespaces every store holds for its own account
    pub const USER: [Namespace; 4] = [
        Namespace::Contacts,
        Namespace::ConvoInfoVolatile,
        Namespace::UserGroups,
        Namespace::UserProfile,
    ];

    pub fn tag(self) -> i16 {
        self as i16
    }

    pub fn name(self) -> &'static str {
        match self {
            Namespace::UserProfile => "user_profile",
            Namespace::Contacts => "contacts",
            Namespace::ConvoInfoVolatile => "convo_info_volatile",
            Namespace::UserGroups => "user_groups",
            Namespace::GroupMessages => "group_messages",
            Namespace::GroupKeys => "group_keys",
            Namespace::GroupInfo => "group_info",
            Namespace::GroupMembers => "group_members",
        }
    }

    /// Key used inside a per-account container entry
    pub fn short_name(self) -> &'static str {
        match self {
            Namespace::GroupKeys => "keys",
            Namespace::GroupInfo => "info",
            Namespace::GroupMembers => "members",
            other => other.name(),
        }
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.is_config() && ns.short_name() == name)
    }

    /// Position in the merge sequence of one batch; keys and profile data
    /// go first because later namespaces may depend on them
    pub fn merge_order(self) -> u8 {
        match self {
            Namespace::UserProfile | Namespace::Contacts | Namespace::GroupKeys => 0,
            Namespace::UserGroups | Namespace::GroupInfo | Namespace::GroupMembers => 1,
            Namespace::ConvoInfoVolatile => 2,
            Namespace::GroupMessages => 3,
        }
    }

    /// Whether messages in this namespace carry a mergeable config
    pub fn is_config(self) -> bool {
        self != Namespace::GroupMessages
    }

    pub fn is_group(self) -> bool {
        matches!(
            self,
            Namespace::GroupMessages
                | Namespace::GroupKeys
                | Namespace::GroupInfo
                | Namespace::GroupMembers
        )
    }

    /// Account id prefix that owns this namespace
    pub fn expected_prefix(self) -> u8 {
        if self.is_group() {
            PREFIX_GROUP
        } else {
            PREFIX_USER
        }
    }
}

impl TryFrom<i16> for Namespace {
    type Error = UnknownNamespace;

    fn try_from(tag: i16) -> Result<Self, Self::Error> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.tag() == tag)
            .ok_or(UnknownNamespace(tag))
    }
}

impl From<Namespace> for i16 {
    fn from(ns: Namespace) -> Self {
        ns.tag()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
