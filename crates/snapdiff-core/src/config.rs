//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::filter::FilterOptions;

/// Configuration for a single snapshot pass.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root directory to snapshot.
    pub root: PathBuf,

    /// Include/exclude patterns, hashing and format.
    #[builder(default)]
    #[serde(default)]
    pub options: FilterOptions,

    /// Follow symbolic links. When off, links are not entered or recorded.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for snapshotting a path with default options.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: FilterOptions::default(),
            follow_symlinks: false,
        }
    }

    /// Replace the filter options.
    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .root("/home/user")
            .options(FilterOptions::new().without_hashing())
            .follow_symlinks(true)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert!(config.options.no_hash);
        assert!(config.follow_symlinks);
    }

    #[test]
    fn test_config_builder_requires_root() {
        assert!(ScanConfig::builder().build().is_err());
        assert!(ScanConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_config_simple() {
        let config = ScanConfig::new("/home/user");
        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert!(!config.follow_symlinks);
        assert!(!config.options.no_hash);
    }
}
