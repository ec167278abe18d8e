//! In-process directory facade.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use abook_core::error::{Error, ValidationError};
use abook_core::{
    AddressBook, Card, Change, Clause, ContactId, ContactProjection, PageRequest, Query, Result,
    SortClause, Source, SourceId, ViewHandle, split_cards,
};

use crate::config::DirectoryConfig;
use crate::events::{DirectoryEvents, EventBus};
use crate::store::RecordStore;
use crate::view::ViewTable;

#[derive(Debug)]
struct Inner {
    store: RwLock<RecordStore>,
    views: ViewTable,
    events: EventBus,
    ready: AtomicBool,
    safe_mode: AtomicBool,
}

/// The contact directory.
///
/// Cloning is cheap; all clones share the same records, views and
/// subscribers. Mutations serialize behind one writer lock and publish their
/// events before releasing it, so subscribers observe changes in the order
/// they were applied.
#[derive(Debug, Clone)]
pub struct Directory {
    inner: Arc<Inner>,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory {
    /// An empty directory: no sources, not ready, safe mode off.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                store: RwLock::new(RecordStore::new()),
                views: ViewTable::new(),
                events: EventBus::new(),
                ready: AtomicBool::new(false),
                safe_mode: AtomicBool::new(false),
            }),
        }
    }

    /// Build a directory from configuration, importing demo data if set.
    ///
    /// The directory is returned not ready; callers flip readiness once
    /// they are done seeding it.
    #[instrument(skip(config))]
    pub async fn from_config(config: &DirectoryConfig) -> Result<Self> {
        let directory = Self::new();
        directory
            .inner
            .safe_mode
            .store(config.safe_mode, Ordering::SeqCst);

        if let Some(source) = &config.default_source {
            directory.try_create_source(source.clone()).await?;
        }

        if let Some(path) = &config.demo_data {
            let imported = directory.load_demo_data(path).await?;
            info!(path = %path.display(), imported, "Imported demo data");
        }

        Ok(directory)
    }

    /// Register a source, failing with a duplicate error if the id is taken.
    #[instrument(skip(self, source), fields(id = %source.id))]
    pub async fn try_create_source(&self, source: Source) -> Result<()> {
        let mut store = self.inner.store.write().await;
        store.add_source(source)
    }

    /// Import every card of a multi-card document.
    ///
    /// Malformed cards are skipped. Returns the ids that were created.
    #[instrument(skip(self, text))]
    pub async fn import_cards(
        &self,
        text: &str,
        source: Option<&SourceId>,
    ) -> Result<Vec<ContactId>> {
        let mut created = Vec::new();
        for block in split_cards(text) {
            match self.create_contact(&block, source).await {
                Ok(id) => created.push(id),
                Err(Error::Validation(e)) => warn!(error = %e, "Skipping malformed card"),
                Err(e) => return Err(e),
            }
        }
        debug!(created = created.len(), "Imported cards");
        Ok(created)
    }

    /// Read a vCard file and import it into the primary source.
    pub async fn load_demo_data(&self, path: &Path) -> Result<usize> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Validation(ValidationError::Other {
                message: format!("cannot read demo data {}: {}", path.display(), e),
            })
        })?;
        Ok(self.import_cards(&text, None).await?.len())
    }

    /// Number of stored contacts across all sources.
    pub async fn len(&self) -> usize {
        self.inner.store.read().await.len()
    }

    /// Returns true if no contacts are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AddressBook for Directory {
    type Events = DirectoryEvents;

    #[instrument(skip(self, query), fields(clause = %query.clause, sort = %query.sort))]
    async fn query(&self, query: &Query) -> Result<ViewHandle> {
        let clause = Clause::parse(&query.clause)?;
        let sort = SortClause::parse(&query.sort);
        for rejected in sort.rejected() {
            warn!(key = %rejected, "Ignoring unsupported sort key");
        }

        let mut records = {
            let store = self.inner.store.read().await;
            store.select(&clause, &query.sources)
        };
        if !sort.is_empty() {
            records.sort_by(|a, b| sort.compare(&a.card, &b.card));
        }

        debug!(matched = records.len(), "Query matched");
        Ok(self
            .inner
            .views
            .open(records, query.fields.clone(), query.owner.clone()))
    }

    #[instrument(skip(self, fields))]
    async fn contacts_details(
        &self,
        view: ViewHandle,
        fields: &[String],
        page: PageRequest,
    ) -> Result<Vec<ContactProjection>> {
        self.inner.views.page(view, fields, page)
    }

    async fn view_count(&self, view: ViewHandle) -> Result<usize> {
        self.inner.views.count(view)
    }

    #[instrument(skip(self))]
    async fn close_view(&self, view: ViewHandle) -> Result<()> {
        self.inner.views.close(view)
    }

    async fn view_owner(&self, view: ViewHandle) -> Result<Option<String>> {
        Ok(self.inner.views.owner(view))
    }

    #[instrument(skip(self, card))]
    async fn create_contact(&self, card: &str, source: Option<&SourceId>) -> Result<ContactId> {
        let card = Card::parse(card)?;

        let mut store = self.inner.store.write().await;
        let target = store.target_source(source)?;
        let id = store.insert(card, target, Utc::now())?;
        self.inner.events.publish(Change::ContactsAdded {
            ids: vec![id.clone()],
        });
        Ok(id)
    }

    #[instrument(skip(self, cards), fields(batch = cards.len()))]
    async fn update_contacts(&self, cards: &[String]) -> Result<usize> {
        let mut store = self.inner.store.write().await;
        let now = Utc::now();

        let mut updated: Vec<ContactId> = Vec::new();
        for text in cards {
            let card = match Card::parse(text) {
                Ok(card) => card,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed update");
                    continue;
                }
            };
            if let Some(id) = store.replace(card, now) {
                updated.push(id);
            }
        }

        let count = updated.len();
        debug!(count, "Updated contacts");
        if count > 0 {
            let mut seen = HashSet::new();
            updated.retain(|id| seen.insert(id.clone()));
            self.inner
                .events
                .publish(Change::ContactsUpdated { ids: updated });
        }
        Ok(count)
    }

    #[instrument(skip(self, ids), fields(batch = ids.len()))]
    async fn remove_contacts(&self, ids: &[ContactId]) -> Result<usize> {
        let mut store = self.inner.store.write().await;
        let removed = store.remove_all(ids);

        let count = removed.len();
        debug!(count, "Removed contacts");
        if count > 0 {
            self.inner
                .events
                .publish(Change::ContactsRemoved { ids: removed });
        }
        Ok(count)
    }

    async fn available_sources(&self) -> Result<Vec<Source>> {
        Ok(self.inner.store.read().await.sources())
    }

    async fn create_source(&self, source: Source) -> Result<bool> {
        match self.try_create_source(source).await {
            Ok(()) => Ok(true),
            Err(Error::Duplicate(e)) => {
                debug!(error = %e, "Source not created");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn remove_source(&self, id: &SourceId) -> Result<bool> {
        let mut store = self.inner.store.write().await;
        let Some(removed) = store.remove_source(id) else {
            return Ok(false);
        };
        if !removed.is_empty() {
            self.inner
                .events
                .publish(Change::ContactsRemoved { ids: removed });
        }
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn reset(&self) -> Result<bool> {
        let mut store = self.inner.store.write().await;
        let removed = store.clear();
        info!(removed = removed.len(), "Directory reset");
        if !removed.is_empty() {
            self.inner
                .events
                .publish(Change::ContactsRemoved { ids: removed });
        }
        Ok(true)
    }

    async fn is_ready(&self) -> Result<bool> {
        Ok(self.inner.ready.load(Ordering::SeqCst))
    }

    async fn set_ready(&self, ready: bool) -> Result<()> {
        if self.inner.ready.swap(ready, Ordering::SeqCst) != ready {
            info!(ready, "Readiness changed");
            self.inner.events.publish(Change::ReadyChanged { ready });
        }
        Ok(())
    }

    async fn safe_mode(&self) -> Result<bool> {
        Ok(self.inner.safe_mode.load(Ordering::SeqCst))
    }

    async fn set_safe_mode(&self, enabled: bool) -> Result<()> {
        if self.inner.safe_mode.swap(enabled, Ordering::SeqCst) != enabled {
            info!(enabled, "Safe mode changed");
            self.inner
                .events
                .publish(Change::SafeModeChanged { safe_mode: enabled });
        }
        Ok(())
    }

    async fn sort_fields(&self) -> Result<Vec<String>> {
        Ok(SortClause::supported_fields()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    #[instrument(skip(self))]
    async fn release_views(&self, owner: &str) -> Result<usize> {
        Ok(self.inner.views.release_owner(owner))
    }

    fn subscribe(&self) -> Result<Self::Events> {
        Ok(DirectoryEvents::from_bus(&self.inner.events))
    }
}
