//! Address book trait.

use async_trait::async_trait;

use crate::Result;
use crate::contact::{ContactProjection, Query, Source};
use crate::types::{ContactId, PageRequest, SourceId, ViewHandle};

use super::EventStream;

/// An address book service.
///
/// Implemented in-process by the memory directory and remotely by the RPC
/// client stub; both behave identically from the caller's point of view.
#[async_trait]
pub trait AddressBook: Send + Sync {
    /// Event stream type for this address book.
    type Events: EventStream;

    /// Open a view over the contacts matching `query`.
    ///
    /// The view is a snapshot: later changes to the directory do not alter it.
    async fn query(&self, query: &Query) -> Result<ViewHandle>;

    /// Read a page of an open view, projected onto `fields`.
    ///
    /// An empty `fields` uses the projection the view was opened with.
    async fn contacts_details(
        &self,
        view: ViewHandle,
        fields: &[String],
        page: PageRequest,
    ) -> Result<Vec<ContactProjection>>;

    /// Number of contacts in an open view.
    async fn view_count(&self, view: ViewHandle) -> Result<usize>;

    /// Close a view. Closing an already closed view is a no-op.
    async fn close_view(&self, view: ViewHandle) -> Result<()>;

    /// The peer that opened `view`, if the view is open and has an owner.
    ///
    /// Transports serving several peers use this to keep each peer to its
    /// own views. Address books that do not track owners report none.
    async fn view_owner(&self, _view: ViewHandle) -> Result<Option<String>> {
        Ok(None)
    }

    /// Store a new contact and return its assigned id.
    ///
    /// Without a `source` the contact goes to the primary source.
    async fn create_contact(&self, card: &str, source: Option<&SourceId>) -> Result<ContactId>;

    /// Replace existing contacts, matched by UID. Returns how many were updated.
    async fn update_contacts(&self, cards: &[String]) -> Result<usize>;

    /// Remove contacts by id. Returns how many were removed.
    async fn remove_contacts(&self, ids: &[ContactId]) -> Result<usize>;

    /// List registered sources.
    async fn available_sources(&self) -> Result<Vec<Source>>;

    /// Register a source. Returns false if the id is already taken.
    async fn create_source(&self, source: Source) -> Result<bool>;

    /// Remove a source and every contact it holds.
    async fn remove_source(&self, id: &SourceId) -> Result<bool>;

    /// Drop every source and contact.
    async fn reset(&self) -> Result<bool>;

    async fn is_ready(&self) -> Result<bool>;

    async fn set_ready(&self, ready: bool) -> Result<()>;

    async fn safe_mode(&self) -> Result<bool>;

    async fn set_safe_mode(&self, enabled: bool) -> Result<()>;

    /// Keys accepted in sort clauses.
    async fn sort_fields(&self) -> Result<Vec<String>>;

    /// Close every view owned by `owner`. Returns how many were closed.
    async fn release_views(&self, owner: &str) -> Result<usize>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> Result<Self::Events>;

    /// Run `query` and read the whole view, closing it afterwards.
    async fn fetch_all(&self, query: &Query) -> Result<Vec<ContactProjection>> {
        let view = self.query(query).await?;
        let result = self.contacts_details(view, &[], PageRequest::all()).await;
        self.close_view(view).await?;
        result
    }
}
