//! abook-memory - In-process contact directory.
//!
//! [`Directory`] implements [`abook_core::AddressBook`] over an in-memory
//! record store. It is the service side of the RPC layer and is also handy
//! directly in tests.

mod config;
mod directory;
mod events;
mod store;
mod view;

pub use config::{DEFAULT_SOURCE_ID, DirectoryConfig};
pub use directory::Directory;
pub use events::DirectoryEvents;
