//! Comparison thresholds

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use formcheck_core::{FormError, FormResult};
use serde::{Deserialize, Serialize};

/// Thresholds used by every comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Maximum joint displacement, in normalized image units
    pub position_threshold: f64,
    /// Maximum angle difference, in degrees
    pub angle_threshold: f64,
    /// Overall accuracy required to pass, in percent
    pub accuracy_threshold: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        ComparisonConfig {
            position_threshold: 0.1,
            angle_threshold: 15.0,
            accuracy_threshold: 75.0,
        }
    }
}

impl ComparisonConfig {
    /// Looser thresholds for validation runs over varied footage
    pub fn lenient() -> Self {
        ComparisonConfig {
            position_threshold: 0.15,
            angle_threshold: 20.0,
            accuracy_threshold: 70.0,
        }
    }

    /// Reject negative or non-finite thresholds
    pub fn validate(self) -> FormResult<Self> {
        for (name, value) in [
            ("position_threshold", self.position_threshold),
            ("angle_threshold", self.angle_threshold),
            ("accuracy_threshold", self.accuracy_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FormError::InvalidThreshold { name, value });
            }
        }
        Ok(self)
    }
}

/// Partial threshold update; `None` leaves a threshold unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_threshold: Option<f64>,
}

impl ThresholdUpdate {
    /// Load from a JSON file; absent fields stay unset so the file can be
    /// layered over any preset
    pub fn from_file(path: impl AsRef<Path>) -> FormResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            if e.is_io() {
                FormError::Io(io::Error::new(io::ErrorKind::Other, e))
            } else {
                FormError::InvalidConfig {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.position_threshold.is_none()
            && self.angle_threshold.is_none()
            && self.accuracy_threshold.is_none()
    }

    /// Apply on top of `config`; the result is validated as a whole
    pub fn apply(&self, config: ComparisonConfig) -> FormResult<ComparisonConfig> {
        ComparisonConfig {
            position_threshold: self.position_threshold.unwrap_or(config.position_threshold),
            angle_threshold: self.angle_threshold.unwrap_or(config.angle_threshold),
            accuracy_threshold: self.accuracy_threshold.unwrap_or(config.accuracy_threshold),
        }
        .validate()
    }
}
