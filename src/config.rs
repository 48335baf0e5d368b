//! Dashboard Settings
//! Optional `dashboard.json` in the working directory; every key has a default.

use crate::data::{default_start_date, Frequency};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings file looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Price sheet loaded at startup when present.
    pub data_path: PathBuf,
    /// First month kept in the percentage-change table.
    pub start_date: NaiveDate,
    /// Commodities selected when a sheet is loaded.
    pub default_commodities: Vec<String>,
    pub default_frequency: Frequency,
    pub window_title: String,
    /// `tracing` filter directive, e.g. `info` or `commodity_dash=debug`.
    pub log_level: String,
    /// PNG export size in pixels.
    pub export_size: (u32, u32),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("CMO-Historical-Data-Monthly.csv"),
            start_date: default_start_date(),
            default_commodities: vec![
                "Crude oil, WTI".to_string(),
                "Coffee, Arabica".to_string(),
                "Gold".to_string(),
                "Palm kernel oil".to_string(),
            ],
            default_frequency: Frequency::Monthly,
            window_title: "Commodities Percentage Change".to_string(),
            log_level: "info".to_string(),
            export_size: (1600, 900),
        }
    }
}

impl Settings {
    /// Read settings from `path`, or defaults if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard() {
        let settings = Settings::default();
        assert_eq!(settings.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(settings.default_frequency, Frequency::Monthly);
        assert_eq!(settings.default_commodities.len(), 4);
        assert_eq!(settings.default_commodities[0], "Crude oil, WTI");
    }

    #[test]
    fn test_partial_json_overrides_only_given_keys() {
        let settings = Settings::from_json(
            r#"{"start_date": "2021-06-01", "default_frequency": "yearly", "export_size": [800, 600]}"#,
        )
        .unwrap();
        assert_eq!(settings.start_date, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
        assert_eq!(settings.default_frequency, Frequency::Yearly);
        assert_eq!(settings.export_size, (800, 600));
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.default_commodities, Settings::default().default_commodities);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load(&path), Err(ConfigError::Parse { .. })));
    }
}
