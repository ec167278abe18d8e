//! abook-core - Core contact directory types and traits.

pub mod contact;
pub mod error;
pub mod traits;
pub mod types;

pub use contact::{
    Card, Change, Clause, ContactProjection, ContactRecord, DirectoryEvent, Property, Query,
    SortClause, Source, split_cards,
};
pub use error::Error;
pub use traits::{AddressBook, EventStream};
pub use types::{ContactId, PageRequest, ServiceUrl, SourceId, ViewHandle};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
