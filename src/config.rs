use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Number of leading rows inspected when looking for a header row.
pub const DEFAULT_SCAN_WINDOW: usize = 10;
/// Minimum number of filled cells a header row must have.
pub const DEFAULT_MIN_FILLED_CELLS: usize = 5;
/// Header terms recognised out of the box.
pub const DEFAULT_HEADER_TERMS: [&str; 4] = ["Title", "Composer", "Artist", "Album"];

/// How a cell is compared against the header vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The trimmed cell equals a term, ignoring case.
    #[default]
    Exact,
    /// The cell contains a term, ignoring case.
    Contains,
}

/// Settings for header-row detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    pub scan_window: usize,
    pub min_filled_cells: usize,
    pub header_terms: Vec<String>,
    pub match_mode: MatchMode,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            scan_window: DEFAULT_SCAN_WINDOW,
            min_filled_cells: DEFAULT_MIN_FILLED_CELLS,
            header_terms: DEFAULT_HEADER_TERMS.iter().map(|term| term.to_string()).collect(),
            match_mode: MatchMode::default(),
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.scan_window == 0 {
            return Err(FusionError::Config("scan_window must be at least 1".into()));
        }
        if self.min_filled_cells == 0 {
            return Err(FusionError::Config(
                "min_filled_cells must be at least 1".into(),
            ));
        }
        if self.header_terms.iter().all(|term| term.trim().is_empty()) {
            return Err(FusionError::Config(
                "header_terms must contain at least one non-empty term".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for a complete merge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FusionConfig {
    /// Directory searched recursively for `.xlsx` inputs.
    pub data_dir: PathBuf,
    /// Directory receiving the timestamped output workbook.
    pub result_dir: PathBuf,
    pub detection: DetectionConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            result_dir: PathBuf::from("result"),
            detection: DetectionConfig::default(),
        }
    }
}

impl FusionConfig {
    /// Loads a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: FusionConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.detection.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_music_library_layout() {
        let config = DetectionConfig::default();
        assert_eq!(config.scan_window, 10);
        assert_eq!(config.min_filled_cells, 5);
        assert_eq!(config.header_terms, vec!["Title", "Composer", "Artist", "Album"]);
        assert_eq!(config.match_mode, MatchMode::Exact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: FusionConfig = serde_json::from_str(
            r#"{ "data_dir": "inbox", "detection": { "match_mode": "contains" } }"#,
        )
        .expect("config parsed");
        assert_eq!(config.data_dir, PathBuf::from("inbox"));
        assert_eq!(config.result_dir, PathBuf::from("result"));
        assert_eq!(config.detection.match_mode, MatchMode::Contains);
        assert_eq!(config.detection.scan_window, DEFAULT_SCAN_WINDOW);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = serde_json::from_str::<FusionConfig>(r#"{ "data_directory": "x" }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn validation_rejects_degenerate_settings() {
        let zero_window = DetectionConfig {
            scan_window: 0,
            ..DetectionConfig::default()
        };
        assert!(matches!(zero_window.validate(), Err(FusionError::Config(_))));

        let no_terms = DetectionConfig {
            header_terms: vec!["  ".into()],
            ..DetectionConfig::default()
        };
        assert!(matches!(no_terms.validate(), Err(FusionError::Config(_))));
    }
}
