use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SECURITY_ID_LEN: usize = 32;

/// Opaque identifier of a listed security (for example `sh.600000`).
///
/// Surrounding whitespace is trimmed. Case is preserved because upstream
/// identifiers are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityId(String);

impl SecurityId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySecurityId);
        }

        let len = trimmed.chars().count();
        if len > MAX_SECURITY_ID_LEN {
            return Err(ValidationError::SecurityIdTooLong {
                len,
                max: MAX_SECURITY_ID_LEN,
            });
        }

        for (index, ch) in trimmed.chars().enumerate() {
            if ch.is_whitespace() || ch.is_control() || ch == '/' {
                return Err(ValidationError::SecurityIdInvalidChar { ch, index });
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SecurityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SecurityId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for SecurityId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SecurityId> for String {
    fn from(value: SecurityId) -> Self {
        value.0
    }
}
