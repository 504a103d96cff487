use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("window_size must be greater than 0")]
    InvalidWindowSize,
    #[error("top_k must be greater than 0")]
    InvalidTopK,
    #[error("report_every must be greater than 0")]
    InvalidReportEvery,
}

/// Run configuration for one counting stream. Every field has a
/// default, so a TOML document may set any subset of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordCountConfig {
    /// Sliding window capacity W.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Inclusive minimum token length (in chars) to be counted at all.
    /// Zero disables the filter.
    #[serde(default = "default_min_word_length")]
    pub min_word_length: usize,
    /// Fold tokens to lowercase before counting.
    #[serde(default)]
    pub ignore_case: bool,
    /// Ranked entries per report.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Report cadence, in observed-token positions.
    #[serde(default = "default_report_every")]
    pub report_every: u64,
}

fn default_window_size() -> usize {
    1000
}

fn default_min_word_length() -> usize {
    5
}

fn default_top_k() -> usize {
    10
}

fn default_report_every() -> u64 {
    1000
}

impl Default for WordCountConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            min_word_length: default_min_word_length(),
            ignore_case: false,
            top_k: default_top_k(),
            report_every: default_report_every(),
        }
    }
}

impl WordCountConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Structural validation; fatal at startup, per the error policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }
        if self.top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }
        if self.report_every == 0 {
            return Err(ConfigError::InvalidReportEvery);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{ConfigError, WordCountConfig};

    #[test]
    fn defaults_match_the_documented_values() {
        let config = WordCountConfig::default();
        assert_eq!(config.window_size, 1000);
        assert_eq!(config.min_word_length, 5);
        assert!(!config.ignore_case);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.report_every, 1000);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_toml_document_falls_back_to_defaults() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("wordwin.toml");
        fs::write(&path, "window_size = 50\nignore_case = true\n").expect("write config");

        let config = WordCountConfig::load_from_path(&path).expect("load should succeed");
        assert_eq!(config.window_size, 50);
        assert!(config.ignore_case);
        assert_eq!(config.min_word_length, 5);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.report_every, 1000);
    }

    #[test]
    fn full_toml_document_round_trips() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("wordwin.toml");
        let config = WordCountConfig {
            window_size: 20,
            min_word_length: 0,
            ignore_case: true,
            top_k: 3,
            report_every: 7,
        };
        let serialized = toml::to_string(&config).expect("serialize config");
        fs::write(&path, serialized).expect("write config");

        let loaded = WordCountConfig::load_from_path(&path).expect("load should succeed");
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_reports_read_error_with_path() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("absent.toml");

        let error = WordCountConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(error, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "window_size = \"lots\"").expect("write config");

        let error = WordCountConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_valued_fields_fail_validation() {
        let mut config = WordCountConfig {
            window_size: 0,
            ..WordCountConfig::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidWindowSize
        ));

        config.window_size = 1;
        config.top_k = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidTopK
        ));

        config.top_k = 1;
        config.report_every = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidReportEvery
        ));

        config.report_every = 1;
        config.min_word_length = 0;
        config.validate().expect("zero min length disables the filter");
    }
}
