//! Configuration for the analytics subsystem
//!
//! Loaded from an optional TOML file; every key has a default.
//!
//! ```toml
//! data_dir = "/home/me/.local/share/toolpulse/analytics"
//! retention_days = 90
//! lock_timeout_ms = 5000
//!
//! [insights]
//! min_invocations_for_insight = 5
//! slow_response_threshold = 5000.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::ConfigError;
use crate::insights::InsightsConfig;

/// Default retention window in days
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

/// Default bound on waiting for a partition lock
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Default delay between lock attempts
pub const DEFAULT_LOCK_RETRY_INTERVAL_MS: u64 = 50;

/// Configuration for the event store and the layers above it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Directory holding partition files
    pub data_dir: PathBuf,

    /// Partition file name prefix (`usage-2026-01-31.json`)
    pub file_prefix: String,

    /// Partition file extension, including the dot
    pub file_extension: String,

    /// Days of history kept by cleanup and read by default
    pub retention_days: u32,

    /// Maximum wait for a partition lock; older lock files are stale
    pub lock_timeout_ms: u64,

    /// Delay between lock attempts
    pub lock_retry_interval_ms: u64,

    /// Insight rule thresholds
    pub insights: InsightsConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_prefix: "usage-".to_string(),
            file_extension: ".json".to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            lock_retry_interval_ms: DEFAULT_LOCK_RETRY_INTERVAL_MS,
            insights: InsightsConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            message: source.message().to_string(),
            source,
        })?;

        config.validate()?;
        debug!(path = %path.display(), data_dir = %config.data_dir.display(), "Loaded config");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values the store cannot operate with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retention_days == 0 {
            return Err(ConfigError::Invalid {
                message: "retention_days must be at least 1".to_string(),
            });
        }
        if self.file_extension.is_empty() || !self.file_extension.starts_with('.') {
            return Err(ConfigError::Invalid {
                message: format!(
                    "file_extension must start with '.', got '{}'",
                    self.file_extension
                ),
            });
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                message: format!("file_prefix must not contain path separators: '{}'", self.file_prefix),
            });
        }
        if self.lock_retry_interval_ms == 0 || self.lock_retry_interval_ms > self.lock_timeout_ms {
            return Err(ConfigError::Invalid {
                message: format!(
                    "lock_retry_interval_ms ({}) must be in 1..=lock_timeout_ms ({})",
                    self.lock_retry_interval_ms, self.lock_timeout_ms
                ),
            });
        }
        self.insights.validate()
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn lock_retry_interval(&self) -> Duration {
        Duration::from_millis(self.lock_retry_interval_ms)
    }
}

/// `<local data dir>/toolpulse/analytics`, or a relative fallback when the
/// platform reports no data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("toolpulse").join("analytics"))
        .unwrap_or_else(|| PathBuf::from(".toolpulse").join("analytics"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.retention_days, 90);
        assert_eq!(config.lock_timeout(), Duration::from_secs(5));
        assert_eq!(config.lock_retry_interval(), Duration::from_millis(50));
        assert_eq!(config.file_prefix, "usage-");
        assert_eq!(config.file_extension, ".json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data_dir = "/var/tmp/toolpulse"
retention_days = 14

[insights]
min_invocations_for_insight = 20
"#
        )
        .unwrap();

        let config = AnalyticsConfig::load(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/tmp/toolpulse"));
        assert_eq!(config.retention_days, 14);
        assert_eq!(config.lock_timeout_ms, DEFAULT_LOCK_TIMEOUT_MS);
        assert_eq!(config.insights.min_invocations_for_insight, 20);
        assert_eq!(
            config.insights.slow_response_threshold,
            InsightsConfig::default().slow_response_threshold
        );
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "retention_days = \"ninety\"").unwrap();

        let err = AnalyticsConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_retention() {
        let config = AnalyticsConfig {
            retention_days: 0,
            ..AnalyticsConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_extension_without_dot() {
        let config = AnalyticsConfig {
            file_extension: "json".to_string(),
            ..AnalyticsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = AnalyticsConfig::load(Path::new("/nonexistent/toolpulse.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
