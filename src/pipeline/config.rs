//! Configuration for the OCR engine.

use crate::core::OcrError;
use crate::processors::Normalization;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Deterministic strategy applied when the first recognition attempt
/// yields no usable text.
///
/// The pretrained model sometimes emits an immediate end-of-sequence on
/// otherwise valid input; a single retry recovers many of these cases
/// without touching the model. Exactly one retry runs per call regardless
/// of policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RetryPolicy {
    /// Re-run preprocessing and generation with the other normalization
    /// convention. This is the canonical policy.
    AlternateNormalization,
    /// Re-run with the same normalization on a crop inset by a fixed
    /// fraction of each side.
    CropInset {
        /// Fraction of each side removed, in `(0, 0.45]`.
        inset: f32,
    },
}

/// Configuration for [`OcrEngine`](crate::pipeline::OcrEngine).
///
/// Defaults match the pretrained manga OCR export: 224x224 input, 64-token
/// bound, `[-1, 1]` primary normalization, alternate-normalization retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrEngineConfig {
    /// Model input size `(width, height)`.
    pub target_size: (u32, u32),
    /// Maximum generation steps per attempt.
    pub max_tokens: usize,
    /// Normalization convention for the first attempt.
    pub primary_normalization: Normalization,
    /// Strategy for the single retry attempt.
    pub retry_policy: RetryPolicy,
    /// Whether to tighten the crop to its ink bounding box before
    /// preprocessing.
    pub autocrop: bool,
    /// Directory where failed samples are written for offline inspection.
    /// `None` disables the debug sink.
    pub debug_dir: Option<PathBuf>,
}

impl Default for OcrEngineConfig {
    fn default() -> Self {
        Self {
            target_size: (224, 224),
            max_tokens: crate::decoder::MAX_TOKEN_LENGTH,
            primary_normalization: Normalization::MinusOneToOne,
            retry_policy: RetryPolicy::AlternateNormalization,
            autocrop: true,
            debug_dir: None,
        }
    }
}

impl OcrEngineConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, OcrError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            OcrError::config_error(format!(
                "failed to parse engine config from '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the target size is zero, the token
    /// bound is zero, or a crop-inset fraction is out of range.
    pub fn validate(&self) -> Result<(), OcrError> {
        if self.target_size.0 == 0 || self.target_size.1 == 0 {
            return Err(OcrError::config_error(format!(
                "target size must be non-zero, got {}x{}",
                self.target_size.0, self.target_size.1
            )));
        }
        if self.max_tokens == 0 {
            return Err(OcrError::config_error("max_tokens must be at least 1"));
        }
        if let RetryPolicy::CropInset { inset } = self.retry_policy {
            if !(inset > 0.0 && inset <= 0.45) {
                return Err(OcrError::config_error(format!(
                    "crop inset must be in (0, 0.45], got {}",
                    inset
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_is_valid() {
        assert!(OcrEngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_dimensions_fail_validation() {
        let config = OcrEngineConfig {
            target_size: (0, 224),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_inset_fails_validation() {
        let config = OcrEngineConfig {
            retry_policy: RetryPolicy::CropInset { inset: 0.9 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "target_size": [224, 224],
                "max_tokens": 32,
                "primary_normalization": "ZeroToOne",
                "retry_policy": {{ "type": "CropInset", "inset": 0.1 }},
                "autocrop": false
            }}"#
        )
        .unwrap();

        let config = OcrEngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_tokens, 32);
        assert_eq!(config.primary_normalization, Normalization::ZeroToOne);
        assert_eq!(config.retry_policy, RetryPolicy::CropInset { inset: 0.1 });
        assert!(!config.autocrop);
        assert_eq!(config.debug_dir, None);
    }
}
