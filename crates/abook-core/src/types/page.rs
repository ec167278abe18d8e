//! Page requests for query views.

use serde::{Deserialize, Serialize};

/// A window into a view's result set.
///
/// On the wire a page is `(startIndex, pageSize)` with a negative page size
/// meaning "all remaining"; [`PageRequest::from_wire`] applies those rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based offset of the first record.
    pub start: usize,
    /// Maximum number of records, or `None` for all remaining.
    pub size: Option<usize>,
}

impl PageRequest {
    /// Every record of the view.
    pub fn all() -> Self {
        Self {
            start: 0,
            size: None,
        }
    }

    /// `size` records starting at `start`.
    pub fn new(start: usize, size: usize) -> Self {
        Self {
            start,
            size: Some(size),
        }
    }

    /// Build from wire integers: negative starts clamp to zero, negative sizes mean all.
    pub fn from_wire(start_index: i32, page_size: i32) -> Self {
        Self {
            start: usize::try_from(start_index).unwrap_or(0),
            size: usize::try_from(page_size).ok(),
        }
    }

    /// Wire form of this page.
    pub fn to_wire(&self) -> (i32, i32) {
        let start = i32::try_from(self.start).unwrap_or(i32::MAX);
        let size = match self.size {
            Some(size) => i32::try_from(size).unwrap_or(i32::MAX),
            None => -1,
        };
        (start, size)
    }

    /// Index range of this page within a result set of `len` records.
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.start.min(len);
        let end = match self.size {
            Some(size) => start.saturating_add(size).min(len),
            None => len,
        };
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_page_size_means_all_remaining() {
        let page = PageRequest::from_wire(2, -1);
        assert_eq!(page.range(5), 2..5);
    }

    #[test]
    fn negative_start_clamps_to_zero() {
        let page = PageRequest::from_wire(-3, 2);
        assert_eq!(page.range(5), 0..2);
    }

    #[test]
    fn start_past_end_is_empty() {
        let page = PageRequest::new(10, 3);
        assert!(page.range(4).is_empty());
    }

    #[test]
    fn wire_form_round_trips() {
        assert_eq!(PageRequest::all().to_wire(), (0, -1));
        assert_eq!(PageRequest::new(4, 2).to_wire(), (4, 2));
    }
}
