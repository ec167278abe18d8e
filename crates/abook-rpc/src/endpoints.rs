//! RPC method names and request/response bodies.
//!
//! Every method is a `POST /rpc/<method>` with a JSON body; `subscribe` is
//! a websocket upgrade on `GET /rpc/<method>`. Failures carry an
//! [`ErrorResponse`] body.

use serde::{Deserialize, Serialize};

use abook_core::{ContactId, ContactProjection, Source, SourceId, ViewHandle};

/// Header carrying the caller's peer id; views opened with it are released
/// by `disconnect`.
pub const PEER_HEADER: &str = "x-abook-peer";

// ============================================================================
// Method Names
// ============================================================================

/// com.canonical.pim.AddressBook.query
pub const QUERY: &str = "com.canonical.pim.AddressBook.query";

/// com.canonical.pim.AddressBookView.contactsDetails
pub const CONTACTS_DETAILS: &str = "com.canonical.pim.AddressBookView.contactsDetails";

/// com.canonical.pim.AddressBookView.count
pub const VIEW_COUNT: &str = "com.canonical.pim.AddressBookView.count";

/// com.canonical.pim.AddressBookView.close
pub const VIEW_CLOSE: &str = "com.canonical.pim.AddressBookView.close";

/// com.canonical.pim.AddressBook.createContact
pub const CREATE_CONTACT: &str = "com.canonical.pim.AddressBook.createContact";

/// com.canonical.pim.AddressBook.updateContacts
pub const UPDATE_CONTACTS: &str = "com.canonical.pim.AddressBook.updateContacts";

/// com.canonical.pim.AddressBook.removeContacts
pub const REMOVE_CONTACTS: &str = "com.canonical.pim.AddressBook.removeContacts";

/// com.canonical.pim.AddressBook.availableSources
pub const AVAILABLE_SOURCES: &str = "com.canonical.pim.AddressBook.availableSources";

/// com.canonical.pim.AddressBook.createSource
pub const CREATE_SOURCE: &str = "com.canonical.pim.AddressBook.createSource";

/// com.canonical.pim.AddressBook.removeSource
pub const REMOVE_SOURCE: &str = "com.canonical.pim.AddressBook.removeSource";

/// com.canonical.pim.AddressBook.reset
pub const RESET: &str = "com.canonical.pim.AddressBook.reset";

/// com.canonical.pim.AddressBook.isReady
pub const IS_READY: &str = "com.canonical.pim.AddressBook.isReady";

/// com.canonical.pim.AddressBook.setReady
pub const SET_READY: &str = "com.canonical.pim.AddressBook.setReady";

/// com.canonical.pim.AddressBook.safeMode
pub const SAFE_MODE: &str = "com.canonical.pim.AddressBook.safeMode";

/// com.canonical.pim.AddressBook.setSafeMode
pub const SET_SAFE_MODE: &str = "com.canonical.pim.AddressBook.setSafeMode";

/// com.canonical.pim.AddressBook.sortFields
pub const SORT_FIELDS: &str = "com.canonical.pim.AddressBook.sortFields";

/// com.canonical.pim.AddressBook.disconnect
pub const DISCONNECT: &str = "com.canonical.pim.AddressBook.disconnect";

/// com.canonical.pim.AddressBook.subscribe
pub const SUBSCRIBE: &str = "com.canonical.pim.AddressBook.subscribe";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body for methods without parameters.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

/// Response from query.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub view: ViewHandle,
}

/// Request body for view methods that only name the view.
#[derive(Debug, Serialize, Deserialize)]
pub struct ViewRequest {
    pub view: ViewHandle,
}

/// Request body for contactsDetails.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsDetailsRequest {
    pub view: ViewHandle,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub start_index: i32,
    #[serde(default = "all_remaining")]
    pub page_size: i32,
}

fn all_remaining() -> i32 {
    -1
}

/// Response from contactsDetails.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactsDetailsResponse {
    pub contacts: Vec<ContactProjection>,
}

/// Response carrying a count (view count, update, remove, disconnect).
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Request body for createContact.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub vcard: String,
    /// Target source; empty means the primary source.
    #[serde(default)]
    pub source_id: String,
}

/// Response from createContact.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateContactResponse {
    pub id: ContactId,
}

/// Request body for updateContacts.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateContactsRequest {
    pub vcards: Vec<String>,
}

/// Request body for removeContacts.
///
/// Ids are plain strings so that one malformed entry is skipped rather than
/// rejecting the whole batch.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveContactsRequest {
    pub ids: Vec<String>,
}

/// Response from availableSources.
#[derive(Debug, Serialize, Deserialize)]
pub struct SourcesResponse {
    pub sources: Vec<Source>,
}

/// Request body for removeSource.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveSourceRequest {
    pub id: SourceId,
}

/// Request or response carrying a single flag.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlagBody {
    pub value: bool,
}

/// Response from sortFields.
#[derive(Debug, Serialize, Deserialize)]
pub struct SortFieldsResponse {
    pub fields: Vec<String>,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contacts_details_defaults_to_everything() {
        let request: ContactsDetailsRequest = serde_json::from_value(json!({"view": 3})).unwrap();
        assert_eq!(request.view, ViewHandle::new(3));
        assert!(request.fields.is_empty());
        assert_eq!(request.start_index, 0);
        assert_eq!(request.page_size, -1);
    }

    #[test]
    fn create_contact_uses_camel_case() {
        let body = serde_json::to_value(CreateContactRequest {
            vcard: "BEGIN:VCARD".to_string(),
            source_id: "S1".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({"vcard": "BEGIN:VCARD", "sourceId": "S1"}));
    }
}
