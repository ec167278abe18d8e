//! Query view handle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token naming an open query view.
///
/// Handles index a server-side table; they are not object references and
/// are never reused within one directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewHandle(u64);

impl ViewHandle {
    /// Wrap a raw handle value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view/{}", self.0)
    }
}
