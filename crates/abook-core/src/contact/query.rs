//! Query parameters.

use serde::{Deserialize, Serialize};

use crate::types::SourceId;

/// Parameters of a `query` call.
///
/// # Example
///
/// ```
/// use abook_core::{Query, SourceId};
///
/// let query = Query::all()
///     .with_clause("EMAIL:example.com")
///     .with_sort("LAST_NAME")
///     .with_sources(vec![SourceId::new("S1").unwrap()]);
/// assert_eq!(query.clause, "EMAIL:example.com");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Field projection applied to every page (empty = all fields).
    #[serde(default)]
    pub fields: Vec<String>,

    /// Filter clause (empty = match all).
    #[serde(default)]
    pub clause: String,

    /// Sort clause (empty = creation order).
    #[serde(default)]
    pub sort: String,

    /// Sources to search (empty = all sources).
    #[serde(default)]
    pub sources: Vec<SourceId>,

    /// Peer that owns the resulting view, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Query {
    /// Everything, unsorted, all fields.
    pub fn all() -> Self {
        Self::default()
    }

    /// Set the filter clause.
    pub fn with_clause(mut self, clause: impl Into<String>) -> Self {
        self.clause = clause.into();
        self
    }

    /// Set the sort clause.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Set the field projection.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the query to some sources.
    pub fn with_sources(mut self, sources: Vec<SourceId>) -> Self {
        self.sources = sources;
        self
    }

    /// Record the peer that owns the view.
    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}
