//! Server-side table of open query views.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use abook_core::error::{InvalidStateError, NotFoundError};
use abook_core::{ContactProjection, ContactRecord, PageRequest, Result, ViewHandle};

/// A snapshot taken by a query.
#[derive(Debug)]
struct OpenView {
    records: Vec<Arc<ContactRecord>>,
    fields: Vec<String>,
    owner: Option<String>,
}

#[derive(Debug, Default)]
struct Table {
    /// Last handle issued. Handles are never reused.
    next: u64,
    open: HashMap<u64, OpenView>,
}

/// Open views, indexed by handle.
///
/// Only open views are kept. A handle that was issued but is no longer open
/// has been closed, so paging it is told apart from paging one that never
/// existed without keeping anything behind.
#[derive(Debug, Default)]
pub(crate) struct ViewTable {
    table: Mutex<Table>,
}

impl ViewTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn open(
        &self,
        records: Vec<Arc<ContactRecord>>,
        fields: Vec<String>,
        owner: Option<String>,
    ) -> ViewHandle {
        let mut table = self.lock();
        table.next += 1;
        let handle = ViewHandle::new(table.next);
        debug!(%handle, len = records.len(), ?owner, "Opened view");
        table.open.insert(
            handle.get(),
            OpenView {
                records,
                fields,
                owner,
            },
        );
        handle
    }

    /// Read a page, projected onto `fields` or the view's own projection.
    pub(crate) fn page(
        &self,
        handle: ViewHandle,
        fields: &[String],
        page: PageRequest,
    ) -> Result<Vec<ContactProjection>> {
        let table = self.lock();
        let view = open_view(&table, handle)?;
        let fields = if fields.is_empty() {
            view.fields.as_slice()
        } else {
            fields
        };

        Ok(view.records[page.range(view.records.len())]
            .iter()
            .map(|r| r.project(fields))
            .collect())
    }

    pub(crate) fn count(&self, handle: ViewHandle) -> Result<usize> {
        let table = self.lock();
        Ok(open_view(&table, handle)?.records.len())
    }

    /// Close a view; closing it again is a no-op.
    pub(crate) fn close(&self, handle: ViewHandle) -> Result<()> {
        let mut table = self.lock();
        if table.open.remove(&handle.get()).is_some() {
            debug!(%handle, "Closed view");
            return Ok(());
        }
        if table.issued(handle) {
            Ok(())
        } else {
            Err(NotFoundError::View {
                handle: handle.to_string(),
            }
            .into())
        }
    }

    /// Close every open view owned by `owner`.
    pub(crate) fn release_owner(&self, owner: &str) -> usize {
        let mut table = self.lock();
        let before = table.open.len();
        table
            .open
            .retain(|_, view| view.owner.as_deref() != Some(owner));
        let released = before - table.open.len();
        debug!(owner, released, "Released views");
        released
    }

    /// The peer that opened `handle`, if the view is open and has one.
    pub(crate) fn owner(&self, handle: ViewHandle) -> Option<String> {
        self.lock()
            .open
            .get(&handle.get())
            .and_then(|view| view.owner.clone())
    }
}

impl Table {
    fn issued(&self, handle: ViewHandle) -> bool {
        (1..=self.next).contains(&handle.get())
    }
}

fn open_view(table: &Table, handle: ViewHandle) -> Result<&OpenView> {
    if let Some(view) = table.open.get(&handle.get()) {
        return Ok(view);
    }
    if table.issued(handle) {
        Err(InvalidStateError::ViewClosed {
            handle: handle.to_string(),
        }
        .into())
    } else {
        Err(NotFoundError::View {
            handle: handle.to_string(),
        }
        .into())
    }
}
