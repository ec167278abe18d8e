//! Core address book types.
//!
//! These types enforce their invariants at construction time,
//! so an invalid identifier or URL cannot reach the directory.

mod contact_id;
mod page;
mod service_url;
mod source_id;
mod view_handle;

pub use contact_id::ContactId;
pub use page::PageRequest;
pub use service_url::ServiceUrl;
pub use source_id::SourceId;
pub use view_handle::ViewHandle;

/// Longest identifier accepted for contacts and sources.
const MAX_ID_LEN: usize = 256;

/// Shared identifier check: non-empty, bounded, no whitespace or control characters.
fn check_identifier(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("must be non-empty".to_string());
    }
    if s.len() > MAX_ID_LEN {
        return Err(format!("must be at most {} bytes", MAX_ID_LEN));
    }
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("must not contain whitespace or control characters".to_string());
    }
    Ok(())
}
