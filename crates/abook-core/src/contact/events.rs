//! Change notifications emitted by the directory.

use serde::{Deserialize, Serialize};

use crate::types::ContactId;

/// One notification, stamped with its position in the directory's event order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEvent {
    /// Sequence number, strictly increasing in emission order.
    pub seq: u64,

    /// RFC 3339 timestamp of emission.
    pub time: String,

    /// What changed.
    pub change: Change,
}

/// The change carried by a [`DirectoryEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Change {
    /// Contacts were created.
    ContactsAdded { ids: Vec<ContactId> },

    /// Contacts were replaced by an update.
    ContactsUpdated { ids: Vec<ContactId> },

    /// Contacts were removed, directly or with their source.
    ContactsRemoved { ids: Vec<ContactId> },

    /// The readiness flag flipped.
    #[serde(rename_all = "camelCase")]
    ReadyChanged { ready: bool },

    /// The safe-mode flag flipped.
    #[serde(rename_all = "camelCase")]
    SafeModeChanged { safe_mode: bool },
}

impl Change {
    /// Signal name of this change.
    pub fn name(&self) -> &'static str {
        match self {
            Change::ContactsAdded { .. } => "contactsAdded",
            Change::ContactsUpdated { .. } => "contactsUpdated",
            Change::ContactsRemoved { .. } => "contactsRemoved",
            Change::ReadyChanged { .. } => "readyChanged",
            Change::SafeModeChanged { .. } => "safeModeChanged",
        }
    }

    /// Contact ids affected by this change (empty for flag changes).
    pub fn ids(&self) -> &[ContactId] {
        match self {
            Change::ContactsAdded { ids }
            | Change::ContactsUpdated { ids }
            | Change::ContactsRemoved { ids } => ids,
            Change::ReadyChanged { .. } | Change::SafeModeChanged { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_form_is_tagged() {
        let event = DirectoryEvent {
            seq: 7,
            time: "2024-01-01T00:00:00Z".to_string(),
            change: Change::SafeModeChanged { safe_mode: true },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value["change"],
            json!({ "type": "safeModeChanged", "safeMode": true })
        );
        assert_eq!(event.change.name(), "safeModeChanged");
    }

    #[test]
    fn ids_of_contact_changes() {
        let ids = vec![ContactId::new("a").unwrap()];
        let change = Change::ContactsRemoved { ids: ids.clone() };
        assert_eq!(change.ids(), ids.as_slice());
        assert!(Change::ReadyChanged { ready: true }.ids().is_empty());
    }
}
