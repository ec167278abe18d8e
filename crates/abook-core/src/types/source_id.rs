//! Source identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ValidationError};

/// A validated source identifier.
///
/// Sources are named origins of contacts, typically one per account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    /// Create a new source id, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        super::check_identifier(&s).map_err(|reason| ValidationError::SourceId {
            value: s.clone(),
            reason,
        })?;
        Ok(Self(s))
    }

    /// Parse an optional wire value where the empty string means "unspecified".
    pub fn parse_optional(s: &str) -> Result<Option<Self>, Error> {
        if s.is_empty() {
            Ok(None)
        } else {
            Self::new(s).map(Some)
        }
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SourceId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_wire_value_is_unspecified() {
        assert_eq!(SourceId::parse_optional("").unwrap(), None);
        assert_eq!(
            SourceId::parse_optional("S1").unwrap(),
            Some(SourceId::new("S1").unwrap())
        );
    }

    #[test]
    fn rejects_whitespace() {
        assert!(SourceId::new("my source").is_err());
    }
}
