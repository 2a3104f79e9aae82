use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    APP_DIR_NAME, DEFAULT_BOX_STROKE_WIDTH, DEFAULT_CONTOUR_DOT_RADIUS,
    DEFAULT_DETECTION_TIMEOUT_MS, DEFAULT_FACE_PADDING, DEFAULT_FALLBACK_CROP_FACTOR,
    DEFAULT_JPEG_QUALITY, MEDIA_INDEX_FILE, PROCESSED_FACES_DIR, SAVED_FACES_DIR,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Tunables for the face processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Directory processed images are written to.
    pub output_dir: PathBuf,
    /// Explicit model file; skips cache lookup when set.
    pub model_path: Option<PathBuf>,
    /// Where to fetch the model when it is neither cached nor bundled.
    pub model_url: Option<String>,
    pub bundled_model_dir: Option<PathBuf>,
    pub confidence: f64,
    pub padding: f64,
    pub jpeg_quality: u8,
    pub detection_timeout_ms: u64,
    pub fallback_crop_factor: f64,
    pub box_stroke_width: u32,
    pub contour_dot_radius: f32,
}

impl ProcessorConfig {
    pub fn detection_timeout(&self) -> Duration {
        Duration::from_millis(self.detection_timeout_ms)
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            output_dir: data_dir().join(PROCESSED_FACES_DIR),
            model_path: None,
            model_url: None,
            bundled_model_dir: None,
            confidence: 0.5,
            padding: DEFAULT_FACE_PADDING,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            detection_timeout_ms: DEFAULT_DETECTION_TIMEOUT_MS,
            fallback_crop_factor: DEFAULT_FALLBACK_CROP_FACTOR,
            box_stroke_width: DEFAULT_BOX_STROKE_WIDTH,
            contour_dot_radius: DEFAULT_CONTOUR_DOT_RADIUS,
        }
    }
}

/// Top-level configuration, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCropConfig {
    pub processor: ProcessorConfig,
    pub saved_faces_dir: PathBuf,
    /// Gallery exports land here.
    pub pictures_dir: PathBuf,
    pub media_index_path: PathBuf,
}

impl Default for AutoCropConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            processor: ProcessorConfig::default(),
            saved_faces_dir: data.join(SAVED_FACES_DIR),
            pictures_dir: dirs::picture_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| data.join("Pictures")),
            media_index_path: data.join(MEDIA_INDEX_FILE),
        }
    }
}

impl AutoCropConfig {
    /// `<config_dir>/AutoCrop/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.json"))
    }

    /// Loads and validates a config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config at [`Self::default_path`], or defaults when absent.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.processor;
        if !(0.0..=1.0).contains(&p.confidence) {
            return Err(ConfigError::Invalid(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                p.confidence
            )));
        }
        if !(0.0..=1.0).contains(&p.padding) {
            return Err(ConfigError::Invalid(format!(
                "padding must be between 0.0 and 1.0, got {}",
                p.padding
            )));
        }
        if p.jpeg_quality == 0 || p.jpeg_quality > 100 {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                p.jpeg_quality
            )));
        }
        if !(p.fallback_crop_factor > 0.0 && p.fallback_crop_factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "fallback_crop_factor must be in (0.0, 1.0], got {}",
                p.fallback_crop_factor
            )));
        }
        if p.detection_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "detection_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = AutoCropConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.processor.jpeg_quality, 95);
        assert_eq!(config.processor.detection_timeout(), Duration::from_secs(5));
        assert!(config.processor.output_dir.ends_with(PROCESSED_FACES_DIR));
        assert!(config.saved_faces_dir.ends_with(SAVED_FACES_DIR));
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "processor": { "padding": 0.3, "output_dir": "/tmp/out" } }"#,
        )
        .unwrap();

        let config = AutoCropConfig::load(&path).unwrap();
        assert_eq!(config.processor.padding, 0.3);
        assert_eq!(config.processor.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.processor.jpeg_quality, DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = AutoCropConfig::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = AutoCropConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[rstest]
    #[case::confidence(r#"{ "processor": { "confidence": 1.5 } }"#)]
    #[case::padding(r#"{ "processor": { "padding": -0.1 } }"#)]
    #[case::quality(r#"{ "processor": { "jpeg_quality": 0 } }"#)]
    #[case::crop_factor(r#"{ "processor": { "fallback_crop_factor": 0.0 } }"#)]
    #[case::timeout(r#"{ "processor": { "detection_timeout_ms": 0 } }"#)]
    fn test_load_rejects_out_of_range_values(#[case] json: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, json).unwrap();
        let err = AutoCropConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = AutoCropConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AutoCropConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
