/*
    profile.rs - Typed views over well-known register fields

    Name and picture keys are shared by the user profile and group info
    configs. The remaining views are user profile only.
*/

use super::errors::FieldError;
use super::state::ConfigState;
use crate::core_codec::Value;

const NAME: &str = "n";
const PIC_URL: &str = "p";
const PIC_KEY: &str = "q";
const NTS_PRIORITY: &str = "+";
const NTS_EXPIRY: &str = "e";
const BLINDED_MSGREQS: &str = "M";

/// Profile picture location and decryption key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePic {
    pub url: String,
    pub key: [u8; 32],
}

impl ConfigState {
    pub fn profile_name(&self) -> Option<&str> {
        self.get_field(NAME)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Empty or `None` clears the name
    pub fn set_profile_name(&mut self, name: Option<&str>) -> Result<bool, FieldError> {
        let value = name.filter(|s| !s.is_empty()).map(Value::text);
        self.set_field(NAME, value)
    }

    /// Present only when both the url and a 32-byte key are set
    pub fn profile_pic(&self) -> Option<ProfilePic> {
        let url = self.get_field(PIC_URL).and_then(Value::as_str).filter(|s| !s.is_empty())?;
        let key = self.get_field(PIC_KEY).and_then(Value::as_bytes)?;
        Some(ProfilePic { url: url.to_string(), key: key.try_into().ok()? })
    }

    /// Sets url and key together; `None` or an empty url clears both
    pub fn set_profile_pic(&mut self, pic: Option<&ProfilePic>) -> Result<bool, FieldError> {
        let (url, key) = match pic.filter(|p| !p.url.is_empty()) {
            Some(p) => (Some(Value::text(p.url.clone())), Some(Value::from(p.key.to_vec()))),
            None => (None, None),
        };
        let url_changed = self.set_field(PIC_URL, url)?;
        let key_changed = self.set_field(PIC_KEY, key)?;
        Ok(url_changed || key_changed)
    }

    /// -1 unset, 0 disabled, 1 enabled
    pub fn blinded_msgreqs(&self) -> i32 {
        match self.get_field(BLINDED_MSGREQS).and_then(Value::as_int) {
            None => -1,
            Some(0) => 0,
            Some(_) => 1,
        }
    }

    /// Negative clears, zero disables, positive enables
    pub fn set_blinded_msgreqs(&mut self, value: i32) -> Result<bool, FieldError> {
        let value = match value {
            v if v < 0 => None,
            0 => Some(Value::Int(0)),
            _ => Some(Value::Int(1)),
        };
        self.set_field(BLINDED_MSGREQS, value)
    }

    /// Note-to-self conversation priority, 0 when unset
    pub fn nts_priority(&self) -> i64 {
        self.get_field(NTS_PRIORITY).and_then(Value::as_int).unwrap_or(0)
    }

    pub fn set_nts_priority(&mut self, priority: i64) -> Result<bool, FieldError> {
        self.set_field(NTS_PRIORITY, (priority != 0).then_some(Value::Int(priority)))
    }

    /// Note-to-self disappearing message timer in seconds
    pub fn nts_expiry(&self) -> Option<i64> {
        self.get_field(NTS_EXPIRY).and_then(Value::as_int).filter(|&s| s > 0)
    }

    pub fn set_nts_expiry(&mut self, seconds: i64) -> Result<bool, FieldError> {
        self.set_field(NTS_EXPIRY, (seconds > 0).then_some(Value::Int(seconds)))
    }
}
