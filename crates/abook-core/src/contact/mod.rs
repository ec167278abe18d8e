//! Contact data and query types.
//!
//! This module defines what travels through the directory. The operations
//! themselves live on [`AddressBook`](crate::AddressBook).

mod card;
mod clause;
mod events;
mod query;
mod record;
mod sort;

pub use card::{Card, Property, split_cards};
pub use clause::Clause;
pub use events::{Change, DirectoryEvent};
pub use query::Query;
pub use record::{ContactProjection, ContactRecord, Source};
pub use sort::SortClause;
