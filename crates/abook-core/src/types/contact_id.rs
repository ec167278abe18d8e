//! Contact identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ValidationError};

/// A validated contact identifier.
///
/// Identifiers are assigned by the directory when a contact is created and
/// never change afterwards. They travel inside the card as its `UID` line.
///
/// # Example
///
/// ```
/// use abook_core::ContactId;
///
/// let id = ContactId::new("5f1c0a2e").unwrap();
/// assert_eq!(id.as_str(), "5f1c0a2e");
/// assert!(ContactId::new("has space").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContactId(String);

impl ContactId {
    /// Create a new contact id, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, too long, or contains
    /// whitespace or control characters.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        super::check_identifier(&s).map_err(|reason| ValidationError::ContactId {
            value: s.clone(),
            reason,
        })?;
        Ok(Self(s))
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContactId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContactId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContactId> for String {
    fn from(id: ContactId) -> Self {
        id.0
    }
}

impl AsRef<str> for ContactId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
