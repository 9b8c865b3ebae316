use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::DetectParams;

/// Static configuration for one batch run: the bucket, the ordered key
/// list, service endpoints, and detection parameters. Loadable from a
/// JSON file; individual fields can be overridden from the CLI.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Object store bucket holding the source images.
    pub bucket: String,
    /// Image keys, processed in exactly this order.
    pub keys: Vec<String>,
    /// Base URL of the object store.
    pub store_endpoint: String,
    /// Base URL of the detection service.
    pub detect_endpoint: String,
    pub max_labels: u32,
    pub min_confidence: f32,
    /// Per-call timeout against both remote services, in seconds.
    pub timeout_secs: u64,
    /// Directory the annotated images are written to.
    pub out_dir: PathBuf,
    /// TrueType font for label text. Without it only boxes are drawn.
    pub font_path: Option<PathBuf>,
    /// Skip failing images instead of aborting the batch.
    pub keep_going: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            keys: Vec::new(),
            store_endpoint: String::new(),
            detect_endpoint: String::new(),
            max_labels: 10,
            min_confidence: 70.0,
            timeout_secs: 30,
            out_dir: PathBuf::from("annotated"),
            font_path: None,
            keep_going: false,
        }
    }
}

impl BatchConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.bucket.is_empty(), "bucket must not be empty");
        anyhow::ensure!(!self.keys.is_empty(), "no image keys given");
        anyhow::ensure!(
            self.keys.iter().all(|k| !k.is_empty()),
            "image keys must not be empty"
        );
        anyhow::ensure!(
            !self.store_endpoint.is_empty(),
            "store endpoint must be set"
        );
        anyhow::ensure!(
            !self.detect_endpoint.is_empty(),
            "detect endpoint must be set"
        );
        anyhow::ensure!(self.max_labels > 0, "max_labels must be > 0");
        anyhow::ensure!(
            (0.0..=100.0).contains(&self.min_confidence),
            "min_confidence must be in [0, 100]"
        );
        Ok(())
    }

    pub fn detect_params(&self) -> DetectParams {
        DetectParams {
            max_labels: self.max_labels,
            min_confidence: self.min_confidence,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> BatchConfig {
        BatchConfig {
            bucket: "photos".to_string(),
            keys: vec!["1.jpg".to_string(), "2.jpg".to_string()],
            store_endpoint: "http://localhost:9000".to_string(),
            detect_endpoint: "http://localhost:9001".to_string(),
            ..BatchConfig::default()
        }
    }

    #[test]
    fn defaults_match_the_detection_service_defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.max_labels, 10);
        assert_eq!(config.min_confidence, 70.0);
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.keep_going);
    }

    #[test]
    fn loads_partial_json_and_keeps_defaults() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{
                "bucket": "photos",
                "keys": ["1.jpg", "2.jpg", "3.jpg"],
                "store_endpoint": "http://store.local",
                "detect_endpoint": "http://detect.local",
                "min_confidence": 55.0
            }}"#
        )?;

        let config = BatchConfig::from_file(file.path())?;
        assert_eq!(config.bucket, "photos");
        assert_eq!(config.keys.len(), 3);
        assert_eq!(config.min_confidence, 55.0);
        assert_eq!(config.max_labels, 10);
        config.validate()?;
        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{"bucet": "typo"}}"#)?;
        assert!(BatchConfig::from_file(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let mut config = valid_config();
        config.max_labels = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.min_confidence = 101.0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.keys.clear();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.bucket.clear();
        assert!(config.validate().is_err());

        assert!(valid_config().validate().is_ok());
    }
}
