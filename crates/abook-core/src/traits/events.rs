//! Change notification stream trait.

use futures_core::Stream;

use crate::Result;
use crate::contact::DirectoryEvent;

/// Stream of directory change notifications.
pub trait EventStream: Stream<Item = Result<DirectoryEvent>> + Send {}

impl<T> EventStream for T where T: Stream<Item = Result<DirectoryEvent>> + Send {}
