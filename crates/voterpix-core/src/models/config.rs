//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Main configuration for the voterpix pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoterpixConfig {
    /// Identifier extraction configuration.
    pub extraction: ExtractionConfig,

    /// Image reading-order configuration.
    pub layout: LayoutConfig,

    /// Image-to-identifier matching configuration.
    pub matching: MatchingConfig,

    /// Output configuration.
    pub output: OutputConfig,

    /// Batch scheduling configuration.
    pub batch: BatchConfig,

    /// License key for the PDF toolkit. Recorded with the run, not activated.
    pub license_key: Option<String>,
}

/// Identifier extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum digits in an identifier.
    pub min_digits: usize,

    /// Maximum digits in an identifier.
    pub max_digits: usize,

    /// Labels marking a row serial number. Any spelling listed here
    /// triggers the same exclusion.
    pub serial_markers: Vec<String>,

    /// Inclusive range of 4-digit values treated as calendar years.
    pub year_range: (u32, u32),
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_digits: 4,
            max_digits: 10,
            serial_markers: vec!["क.सं.".to_string(), "क.स.".to_string()],
            year_range: (1900, 2099),
        }
    }
}

/// Where the page coordinate system has its vertical origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalOrigin {
    /// Y grows upwards (PDF user space).
    BottomLeft,
    /// Y grows downwards (raster space).
    TopLeft,
}

/// Image reading-order configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum vertical distance between two images on the same row.
    pub row_tolerance: f32,

    /// Vertical origin of image positions.
    pub origin: VerticalOrigin,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 20.0,
            origin: VerticalOrigin::BottomLeft,
        }
    }
}

/// Image-to-identifier matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Leading images treated as header/logo content on dense pages.
    pub header_skip_count: usize,

    /// Header images are only skipped when a page has more images than this.
    pub density_threshold: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            header_skip_count: 3,
            density_threshold: 40,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; each document writes to its own subdirectory.
    pub output_root: PathBuf,

    /// JPEG quality (1 - 100).
    pub jpeg_quality: u8,

    /// Number of leading pages skipped in every document (cover pages).
    pub skip_leading_pages: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            jpeg_quality: 90,
            skip_leading_pages: 1,
        }
    }
}

/// Batch scheduling configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum documents processed at once (None = available parallelism).
    pub max_parallel: Option<usize>,
}

impl BatchConfig {
    /// Resolve the effective number of concurrent documents.
    pub fn effective_parallelism(&self) -> usize {
        self.max_parallel.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

impl VoterpixConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.extraction;
        if ext.min_digits == 0 || ext.min_digits > ext.max_digits {
            return Err(invalid(
                "extraction.min_digits",
                format!("must be between 1 and max_digits ({})", ext.max_digits),
            ));
        }
        if ext.year_range.0 > ext.year_range.1 {
            return Err(invalid("extraction.year_range", "start is after end"));
        }
        if !self.layout.row_tolerance.is_finite() || self.layout.row_tolerance < 0.0 {
            return Err(invalid("layout.row_tolerance", "must be a non-negative number"));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(invalid("output.jpeg_quality", "must be between 1 and 100"));
        }
        if self.batch.max_parallel == Some(0) {
            return Err(invalid("batch.max_parallel", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_observed_layout() {
        let config = VoterpixConfig::default();
        assert_eq!(config.matching.header_skip_count, 3);
        assert_eq!(config.matching.density_threshold, 40);
        assert_eq!(config.layout.row_tolerance, 20.0);
        assert_eq!(config.output.jpeg_quality, 90);
        assert_eq!(config.output.output_root, PathBuf::from("output"));
        assert_eq!(config.extraction.serial_markers.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: VoterpixConfig =
            serde_json::from_str(r#"{"matching": {"density_threshold": 10}, "layout": {"origin": "top-left"}}"#)
                .unwrap();
        assert_eq!(config.matching.density_threshold, 10);
        assert_eq!(config.matching.header_skip_count, 3);
        assert_eq!(config.layout.origin, VerticalOrigin::TopLeft);
        assert_eq!(config.extraction.year_range, (1900, 2099));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = VoterpixConfig::default();
        config.extraction.min_digits = 12;
        assert!(config.validate().is_err());

        let mut config = VoterpixConfig::default();
        config.output.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = VoterpixConfig::default();
        config.batch.max_parallel = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = VoterpixConfig::default();
        config.matching.header_skip_count = 2;
        config.save(&path).unwrap();

        let loaded = VoterpixConfig::from_file(&path).unwrap();
        assert_eq!(loaded.matching.header_skip_count, 2);
    }

    #[test]
    fn test_from_file_missing() {
        let err = VoterpixConfig::from_file(Path::new("/nonexistent/voterpix.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
