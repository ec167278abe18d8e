//! abook-rpc - JSON-over-HTTP transport for the contact directory.
//!
//! The [`server`] module exposes any [`abook_core::AddressBook`] through
//! axum; [`RpcAddressBook`] is the matching client stub.

mod address_book;
pub mod client;
pub mod endpoints;
mod events;
pub mod server;

pub use address_book::RpcAddressBook;
pub use client::RpcClient;
pub use events::RpcEvents;
pub use server::{router, serve};
