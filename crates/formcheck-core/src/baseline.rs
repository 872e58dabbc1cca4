//! Baseline record - the reference pose a live sample is scored against
//!
//! A baseline is either reduced to per-field statistics (`average`,
//! `median`, `first`) or keeps every reference sample verbatim (`all`).

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{ArmAngles, ArmJoints, JointSample, PerArm, PoseAngles, PoseLandmarks};

fn default_visibility() -> f64 {
    1.0
}

/// How reference samples are combined into a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMethod {
    /// Mean and population standard deviation
    #[default]
    Average,
    /// Median and population standard deviation
    Median,
    /// First sample verbatim, no statistics
    First,
    /// Every sample retained, no reduction
    All,
}

impl AggregateMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateMethod::Average => "average",
            AggregateMethod::Median => "median",
            AggregateMethod::First => "first",
            AggregateMethod::All => "all",
        }
    }

    /// Does this method produce a single reduced baseline?
    pub fn is_reducing(self) -> bool {
        !matches!(self, AggregateMethod::All)
    }
}

impl fmt::Display for AggregateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Baseline statistics for one joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointStat {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_y: Option<f64>,
}

impl JointStat {
    /// A single observation, carrying no spread
    pub fn from_sample(sample: &JointSample) -> Self {
        Self {
            x: sample.x,
            y: sample.y,
            visibility: sample.visibility,
            std_x: None,
            std_y: None,
        }
    }

    /// Combined positional spread, when both axes carry a deviation
    pub fn spread(&self) -> Option<f64> {
        match (self.std_x, self.std_y) {
            (Some(sx), Some(sy)) => Some((sx * sx + sy * sy).sqrt()),
            _ => None,
        }
    }
}

/// Baseline statistics for one angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AngleStat {
    pub value: f64,
    #[serde(default)]
    pub std: f64,
}

impl AngleStat {
    pub fn new(value: f64, std: f64) -> Self {
        Self { value, std }
    }

    /// A single observation, carrying no spread
    pub fn exact(value: f64) -> Self {
        Self::new(value, 0.0)
    }
}

/// Per-joint statistics for both arms
pub type LandmarkStats = PerArm<ArmJoints<JointStat>>;

/// Per-angle statistics for both arms
pub type AngleStats = PerArm<ArmAngles<AngleStat>>;

/// One processed reference sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSample {
    pub landmarks: PoseLandmarks,
    pub angles: PoseAngles,
}

impl ReferenceSample {
    pub fn new(landmarks: PoseLandmarks, angles: PoseAngles) -> Self {
        Self { landmarks, angles }
    }
}

/// Reduced statistics, or the retained samples they would be reduced from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<S, R> {
    Reduced(S),
    Retained(Vec<R>),
}

impl<S, R> Reference<S, R> {
    pub fn reduced(&self) -> Option<&S> {
        match self {
            Reference::Reduced(stats) => Some(stats),
            Reference::Retained(_) => None,
        }
    }

    pub fn retained(&self) -> Option<&[R]> {
        match self {
            Reference::Reduced(_) => None,
            Reference::Retained(samples) => Some(samples),
        }
    }
}

/// Provenance of a baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetadata {
    pub created_at: NaiveDateTime,
    pub source_folder: String,
    pub num_images_processed: usize,
    pub processed_files: Vec<String>,
    pub aggregate_method: AggregateMethod,
}

/// The persisted baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub metadata: BaselineMetadata,
    pub baseline_landmarks: Reference<LandmarkStats, PoseLandmarks>,
    pub baseline_angles: Reference<AngleStats, PoseAngles>,
    #[serde(default)]
    pub individual_samples: Option<Vec<ReferenceSample>>,
}

impl Baseline {
    pub fn method(&self) -> AggregateMethod {
        self.metadata.aggregate_method
    }

    /// Reduced statistics, if this baseline was reduced
    pub fn stats(&self) -> Option<(&LandmarkStats, &AngleStats)> {
        Some((self.baseline_landmarks.reduced()?, self.baseline_angles.reduced()?))
    }

    /// Retained samples, if this baseline kept every sample
    pub fn retained_samples(&self) -> Option<Vec<ReferenceSample>> {
        let landmarks = self.baseline_landmarks.retained()?;
        let angles = self.baseline_angles.retained()?;
        Some(
            landmarks
                .iter()
                .zip(angles)
                .map(|(l, a)| ReferenceSample::new(l.clone(), a.clone()))
                .collect(),
        )
    }

    /// Check that the record's shape agrees with its declared method
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.metadata.num_images_processed == 0 {
            return Err("num_images_processed is zero".to_string());
        }

        let count = self.metadata.num_images_processed;
        let method = self.method();
        if method.is_reducing() {
            if self.stats().is_none() {
                return Err(format!("method {method} requires reduced landmark and angle statistics"));
            }
            if let Some(samples) = &self.individual_samples {
                if samples.len() != count {
                    return Err(format!(
                        "num_images_processed is {count} but individual_samples holds {}",
                        samples.len()
                    ));
                }
            }
            return Ok(());
        }

        let (Some(landmarks), Some(angles)) =
            (self.baseline_landmarks.retained(), self.baseline_angles.retained())
        else {
            return Err("method all requires retained landmark and angle samples".to_string());
        };
        if landmarks.len() != angles.len() {
            return Err(format!(
                "retained sample count mismatch: {} landmark sets, {} angle sets",
                landmarks.len(),
                angles.len()
            ));
        }
        if landmarks.len() != count {
            return Err(format!(
                "num_images_processed is {count} but {} samples are retained",
                landmarks.len()
            ));
        }
        if self.individual_samples.is_some() {
            return Err("method all must not carry individual_samples".to_string());
        }
        Ok(())
    }
}
