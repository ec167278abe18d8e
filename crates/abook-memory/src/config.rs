//! Directory configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use abook_core::{Source, SourceId};

/// Identifier of the source registered when nothing else is configured.
pub const DEFAULT_SOURCE_ID: &str = "system-address-book";

/// Start-up configuration for a [`Directory`](crate::Directory).
///
/// ```
/// use abook_memory::DirectoryConfig;
///
/// let config: DirectoryConfig = serde_json::from_str(r#"{"safeMode": true}"#).unwrap();
/// assert!(config.safe_mode);
/// assert!(config.default_source.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryConfig {
    /// Source registered at start-up; `None` starts without sources.
    #[serde(default = "default_source")]
    pub default_source: Option<Source>,

    /// Initial safe-mode flag.
    #[serde(default)]
    pub safe_mode: bool,

    /// Multi-card vCard file imported into the default source at start-up.
    #[serde(default)]
    pub demo_data: Option<PathBuf>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            default_source: default_source(),
            safe_mode: false,
            demo_data: None,
        }
    }
}

impl DirectoryConfig {
    /// A configuration with no sources, no demo data and safe mode off.
    pub fn empty() -> Self {
        Self {
            default_source: None,
            ..Self::default()
        }
    }
}

fn default_source() -> Option<Source> {
    let id = SourceId::new(DEFAULT_SOURCE_ID).ok()?;
    Some(
        Source::new(id, "Personal")
            .with_account("local", "", 0)
            .with_primary(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registers_primary_personal_source() {
        let config = DirectoryConfig::default();
        let source = config.default_source.unwrap();
        assert_eq!(source.id.as_str(), DEFAULT_SOURCE_ID);
        assert_eq!(source.display_name, "Personal");
        assert_eq!(source.provider, "local");
        assert!(source.primary);
    }

    #[test]
    fn null_default_source_disables_it() {
        let config: DirectoryConfig =
            serde_json::from_str(r#"{"defaultSource": null, "demoData": "cards.vcf"}"#).unwrap();
        assert_eq!(config.default_source, None);
        assert_eq!(config.demo_data, Some(PathBuf::from("cards.vcf")));
    }
}
