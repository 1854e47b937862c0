//! Watcher configuration.
//!
//! Provides a builder-style, immutable configuration value with YAML
//! loading. Validation happens wholesale when watching starts; a running
//! session never sees a partially applied configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Default skipped-frame threshold (stall reported when exceeded).
pub const DEFAULT_MIN_SKIP_FRAME_COUNT: u32 = 1;

/// Default ring buffer capacity (snapshots kept between flushes).
pub const DEFAULT_CACHE_DATA_SIZE: usize = 10;

/// Default log sink tag.
pub const DEFAULT_TAG: &str = "UiWatcher";

/// Default directory name under the storage root.
pub const DEFAULT_CACHE_DIRECTORY: &str = "UiWatcher";

/// Default persisted file name (`.txt` is appended at write time).
pub const DEFAULT_CACHE_FILE_NAME: &str = "UiWatcherLogData";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Configuration for a watching session.
///
/// All fields have defaults; construct with [`WatchConfig::new`] and the
/// `with_*` builders, or load from YAML with [`WatchConfig::load`]. The
/// value is immutable once a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Skipped-frame threshold; a flush triggers when the estimated skip
    /// count exceeds this value. Must be >= 1.
    pub min_skip_frame_count: u32,

    /// Maximum snapshots buffered between flushes. Must be >= 1.
    pub cache_data_size: usize,

    /// Tag passed to the log sink on every emission.
    pub tag: String,

    /// Whether flushed text is also appended to a per-day file.
    pub persist_to_file: bool,

    /// Directory name under the storage root (required when persisting).
    pub cache_directory: String,

    /// Persisted file name without extension (required when persisting).
    pub cache_file_name: String,

    /// Writable storage root supplied by the host.
    pub storage_root: PathBuf,

    /// Keyword filter for stack frames; a frame is kept iff it contains at
    /// least one keyword as a substring. Empty = accept all frames.
    pub keywords: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            min_skip_frame_count: DEFAULT_MIN_SKIP_FRAME_COUNT,
            cache_data_size: DEFAULT_CACHE_DATA_SIZE,
            tag: DEFAULT_TAG.to_string(),
            persist_to_file: true,
            cache_directory: DEFAULT_CACHE_DIRECTORY.to_string(),
            cache_file_name: DEFAULT_CACHE_FILE_NAME.to_string(),
            storage_root: std::env::temp_dir(),
            keywords: Vec::new(),
        }
    }
}

impl WatchConfig {
    /// Create a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML file and validate it.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the skipped-frame threshold.
    pub fn with_min_skip_frame_count(mut self, count: u32) -> Self {
        self.min_skip_frame_count = count;
        self
    }

    /// Set the ring buffer capacity.
    pub fn with_cache_data_size(mut self, size: usize) -> Self {
        self.cache_data_size = size;
        self
    }

    /// Set the log sink tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Enable or disable file persistence.
    pub fn with_persist_to_file(mut self, persist: bool) -> Self {
        self.persist_to_file = persist;
        self
    }

    /// Set the directory name under the storage root.
    pub fn with_cache_directory(mut self, directory: impl Into<String>) -> Self {
        self.cache_directory = directory.into();
        self
    }

    /// Set the persisted file name (without extension).
    pub fn with_cache_file_name(mut self, name: impl Into<String>) -> Self {
        self.cache_file_name = name.into();
        self
    }

    /// Set the writable storage root.
    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Set the keyword filter.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_skip_frame_count < 1 {
            return Err(ConfigError::Validation(
                "min_skip_frame_count must be >= 1".to_string(),
            ));
        }

        if self.cache_data_size < 1 {
            return Err(ConfigError::Validation(
                "cache_data_size must be >= 1".to_string(),
            ));
        }

        if self.tag.is_empty() {
            return Err(ConfigError::Validation(
                "tag cannot be empty".to_string(),
            ));
        }

        if self.persist_to_file {
            if self.cache_directory.is_empty() {
                return Err(ConfigError::Validation(
                    "cache_directory cannot be empty when persist_to_file is enabled".to_string(),
                ));
            }
            if self.cache_file_name.is_empty() {
                return Err(ConfigError::Validation(
                    "cache_file_name cannot be empty when persist_to_file is enabled".to_string(),
                ));
            }
            if self.storage_root.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "storage_root cannot be empty when persist_to_file is enabled".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = WatchConfig::new();
        assert_eq!(config.min_skip_frame_count, 1);
        assert_eq!(config.cache_data_size, 10);
        assert_eq!(config.tag, "UiWatcher");
        assert!(config.persist_to_file);
        assert_eq!(config.cache_directory, "UiWatcher");
        assert_eq!(config.cache_file_name, "UiWatcherLogData");
        assert!(config.keywords.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = WatchConfig::new()
            .with_min_skip_frame_count(3)
            .with_cache_data_size(50)
            .with_tag("MyWatcher")
            .with_persist_to_file(false)
            .with_keywords(vec!["com.app".to_string()]);

        assert_eq!(config.min_skip_frame_count, 3);
        assert_eq!(config.cache_data_size, 50);
        assert_eq!(config.tag, "MyWatcher");
        assert!(!config.persist_to_file);
        assert_eq!(config.keywords, vec!["com.app".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_threshold() {
        let config = WatchConfig::new().with_min_skip_frame_count(0);
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("min_skip_frame_count")
        );
    }

    #[test]
    fn test_config_validation_zero_capacity() {
        let config = WatchConfig::new().with_cache_data_size(0);
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cache_data_size"));
    }

    #[test]
    fn test_config_validation_empty_tag() {
        let config = WatchConfig::new().with_tag("");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("tag"));
    }

    #[test]
    fn test_config_validation_missing_cache_directory() {
        let config = WatchConfig::new().with_cache_directory("");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cache_directory"));
    }

    #[test]
    fn test_config_validation_empty_directory_ok_without_persistence() {
        let config = WatchConfig::new()
            .with_persist_to_file(false)
            .with_cache_directory("");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.yaml");
        std::fs::write(
            &path,
            "min_skip_frame_count: 2\ncache_data_size: 5\ntag: Loaded\npersist_to_file: false\nkeywords:\n  - com.app\n",
        )
        .unwrap();

        let config = WatchConfig::load(&path).unwrap();
        assert_eq!(config.min_skip_frame_count, 2);
        assert_eq!(config.cache_data_size, 5);
        assert_eq!(config.tag, "Loaded");
        assert!(!config.persist_to_file);
        assert_eq!(config.keywords, vec!["com.app".to_string()]);
        // Unspecified fields keep their defaults.
        assert_eq!(config.cache_directory, DEFAULT_CACHE_DIRECTORY);
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.yaml");
        std::fs::write(&path, "min_skip_frame_count: [not a number]\n").unwrap();
        assert!(WatchConfig::load(&path).is_err());
    }

    #[test]
    fn test_config_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.yaml");
        std::fs::write(&path, "cache_data_size: 0\n").unwrap();
        let result = WatchConfig::load(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cache_data_size"));
    }
}
