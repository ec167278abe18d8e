//! Contact and source records exchanged with the directory.

use serde::{Deserialize, Serialize};

use super::Card;
use crate::types::{ContactId, SourceId};

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    /// Identifier assigned by the directory; mirrored in the card's `UID`.
    pub id: ContactId,

    /// Source the contact belongs to.
    pub source_id: SourceId,

    /// The contact card.
    pub card: Card,
}

impl ContactRecord {
    /// Project this record onto a field list (empty means all fields).
    pub fn project(&self, fields: &[String]) -> ContactProjection {
        ContactProjection {
            id: self.id.clone(),
            source_id: self.source_id.clone(),
            card: self.card.project(fields),
        }
    }
}

/// A contact as returned by a query view, holding only the requested fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactProjection {
    /// Identifier of the projected contact.
    pub id: ContactId,

    /// Source the contact belongs to.
    pub source_id: SourceId,

    /// The projected card, serialized in its textual form.
    #[serde(rename = "vcard")]
    pub card: Card,
}

impl ContactProjection {
    /// First value of a card property, e.g. `field("FN")`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.card.first(name)
    }
}

/// A named origin of contacts, usually one per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Unique source identifier.
    pub id: SourceId,

    /// Human-readable name.
    pub display_name: String,

    /// Application that owns the account, if any.
    #[serde(default)]
    pub application_id: String,

    /// Account provider name (e.g. `google`, `local`).
    #[serde(default)]
    pub provider: String,

    /// Numeric account id in the account framework (0 when not linked).
    #[serde(default)]
    pub account_id: u32,

    /// Contacts from this source should not be edited by clients.
    #[serde(default)]
    pub read_only: bool,

    /// Default target for writes that do not name a source.
    #[serde(default)]
    pub primary: bool,
}

impl Source {
    /// A writable, non-primary source with no account binding.
    pub fn new(id: SourceId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            application_id: String::new(),
            provider: String::new(),
            account_id: 0,
            read_only: false,
            primary: false,
        }
    }

    /// Set the primary flag.
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Set the read-only flag.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Bind the source to an account.
    pub fn with_account(
        mut self,
        provider: impl Into<String>,
        application_id: impl Into<String>,
        account_id: u32,
    ) -> Self {
        self.provider = provider.into();
        self.application_id = application_id.into();
        self.account_id = account_id;
        self
    }
}
