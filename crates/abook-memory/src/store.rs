//! In-memory record storage for the directory.
//!
//! The store is plain data; [`Directory`](crate::Directory) wraps it in a
//! read/write lock and publishes events for what the store reports changed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use abook_core::error::{DuplicateError, NotFoundError};
use abook_core::{Card, Clause, ContactId, ContactRecord, Result, Source, SourceId};

/// Contacts and sources held by one directory.
///
/// Records are keyed by a creation sequence number so that iteration yields
/// creation order; updates keep the original position.
#[derive(Debug, Default)]
pub(crate) struct RecordStore {
    records: BTreeMap<u64, Arc<ContactRecord>>,
    index: HashMap<ContactId, u64>,
    sources: Vec<Source>,
    next_seq: u64,
}

impl RecordStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Sources
    // ========================================================================

    pub(crate) fn sources(&self) -> Vec<Source> {
        self.sources.clone()
    }

    pub(crate) fn source(&self, id: &SourceId) -> Option<&Source> {
        self.sources.iter().find(|s| &s.id == id)
    }

    pub(crate) fn primary(&self) -> Option<&Source> {
        self.sources.iter().find(|s| s.primary)
    }

    /// Register a source. A new primary demotes the current one.
    #[instrument(skip(self, source), fields(id = %source.id, primary = source.primary))]
    pub(crate) fn add_source(&mut self, source: Source) -> Result<()> {
        if self.source(&source.id).is_some() {
            return Err(DuplicateError::Source {
                id: source.id.to_string(),
            }
            .into());
        }

        if source.primary {
            for existing in self.sources.iter_mut().filter(|s| s.primary) {
                debug!(demoted = %existing.id, "Demoting previous primary source");
                existing.primary = false;
            }
        }

        self.sources.push(source);
        Ok(())
    }

    /// Remove a source and its contacts.
    ///
    /// Returns `None` if the source does not exist, otherwise the ids of the
    /// contacts removed along with it.
    #[instrument(skip(self))]
    pub(crate) fn remove_source(&mut self, id: &SourceId) -> Option<Vec<ContactId>> {
        let position = self.sources.iter().position(|s| &s.id == id)?;
        self.sources.remove(position);

        let doomed: Vec<ContactId> = self
            .records
            .values()
            .filter(|r| &r.source_id == id)
            .map(|r| r.id.clone())
            .collect();
        for contact in &doomed {
            self.remove(contact);
        }

        debug!(removed = doomed.len(), "Removed source");
        Some(doomed)
    }

    /// Drop every source and contact, returning the removed contact ids.
    pub(crate) fn clear(&mut self) -> Vec<ContactId> {
        let removed = self.records.values().map(|r| r.id.clone()).collect();
        self.records.clear();
        self.index.clear();
        self.sources.clear();
        removed
    }

    // ========================================================================
    // Contacts
    // ========================================================================

    /// Resolve the source a new contact goes to.
    pub(crate) fn target_source(&self, requested: Option<&SourceId>) -> Result<SourceId> {
        match requested {
            Some(id) => self
                .source(id)
                .map(|s| s.id.clone())
                .ok_or_else(|| NotFoundError::Source { id: id.to_string() }.into()),
            None => self
                .primary()
                .map(|s| s.id.clone())
                .ok_or_else(|| NotFoundError::PrimarySource.into()),
        }
    }

    /// Store a new contact under a fresh id.
    ///
    /// Any `UID` in the card is replaced by the assigned id and `REV` is set
    /// to `now`.
    #[instrument(skip(self, card))]
    pub(crate) fn insert(
        &mut self,
        mut card: Card,
        source_id: SourceId,
        now: DateTime<Utc>,
    ) -> Result<ContactId> {
        let id = self.fresh_id()?;
        card.set_uid(id.as_str());
        card.set_rev(now);

        let seq = self.next_seq;
        self.next_seq += 1;

        self.index.insert(id.clone(), seq);
        self.records.insert(
            seq,
            Arc::new(ContactRecord {
                id: id.clone(),
                source_id,
                card,
            }),
        );

        debug!(%id, "Created contact");
        Ok(id)
    }

    /// Replace the card of the contact named by the card's `UID`.
    ///
    /// Returns the updated id, or `None` when the card carries no usable
    /// `UID` or no such contact exists.
    pub(crate) fn replace(&mut self, mut card: Card, now: DateTime<Utc>) -> Option<ContactId> {
        let Some(uid) = card.uid() else {
            warn!("Skipping update without UID");
            return None;
        };
        let id = match ContactId::new(uid) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Skipping update with malformed UID");
                return None;
            }
        };
        let Some(&seq) = self.index.get(&id) else {
            debug!(%id, "Skipping update of unknown contact");
            return None;
        };
        let slot = self.records.get_mut(&seq)?;

        card.set_rev(now);
        *slot = Arc::new(ContactRecord {
            id: id.clone(),
            source_id: slot.source_id.clone(),
            card,
        });
        Some(id)
    }

    /// Remove a batch of contacts; duplicated and unknown ids are ignored.
    pub(crate) fn remove_all(&mut self, ids: &[ContactId]) -> Vec<ContactId> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(*id))
            .filter(|id| self.remove(id))
            .cloned()
            .collect()
    }

    fn remove(&mut self, id: &ContactId) -> bool {
        match self.index.remove(id) {
            Some(seq) => self.records.remove(&seq).is_some(),
            None => false,
        }
    }

    /// Records matching `clause` within `sources` (empty = all), in creation order.
    pub(crate) fn select(&self, clause: &Clause, sources: &[SourceId]) -> Vec<Arc<ContactRecord>> {
        self.records
            .values()
            .filter(|r| sources.is_empty() || sources.contains(&r.source_id))
            .filter(|r| clause.matches(r))
            .cloned()
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    fn fresh_id(&self) -> Result<ContactId> {
        loop {
            let id = ContactId::new(Uuid::new_v4().simple().to_string())?;
            if !self.index.contains_key(&id) {
                return Ok(id);
            }
        }
    }
}
