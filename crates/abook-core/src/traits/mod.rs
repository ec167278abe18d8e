//! Core traits for address book behavior.

mod address_book;
mod events;

pub use address_book::AddressBook;
pub use events::EventStream;
