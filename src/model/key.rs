// ABOUTME: Defines PermissionKey - the parsed "<functionality>.<action>" query key.
// ABOUTME: Parsing fails fast with a typed error instead of a lookup fault.

use std::fmt;
use std::str::FromStr;

use crate::error::CheckError;

/// Separator between the functionality and action halves of a key.
pub const KEY_SEPARATOR: char = '.';

/// Identifies one action within one functionality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionKey {
    functionality: String,
    action: String,
}

impl PermissionKey {
    /// Create a key from its two halves.
    ///
    /// Neither half may be empty or contain the separator.
    pub fn new(
        functionality: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<Self, CheckError> {
        let functionality = functionality.into();
        let action = action.into();

        if !is_valid_segment(&functionality) || !is_valid_segment(&action) {
            return Err(CheckError::InvalidKey(format!(
                "{functionality}{KEY_SEPARATOR}{action}"
            )));
        }

        Ok(Self {
            functionality,
            action,
        })
    }

    /// Parse a key of the form `"<functionality>.<action>"`.
    pub fn parse(key: &str) -> Result<Self, CheckError> {
        let (functionality, action) = key
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| CheckError::InvalidKey(key.to_string()))?;

        Self::new(functionality, action).map_err(|_| CheckError::InvalidKey(key.to_string()))
    }

    /// The functionality half of the key.
    pub fn functionality(&self) -> &str {
        &self.functionality
    }

    /// The action half of the key.
    pub fn action(&self) -> &str {
        &self.action
    }
}

pub(crate) fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(KEY_SEPARATOR)
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.functionality, KEY_SEPARATOR, self.action)
    }
}

impl FromStr for PermissionKey {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for PermissionKey {
    type Error = CheckError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = CheckError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Join two halves into the textual key form, without validation.
pub(crate) fn join_key(functionality: &str, action: &str) -> String {
    format!("{functionality}{KEY_SEPARATOR}{action}")
}
