//! Comparison result records

use formcheck_core::{Arm, ArmAngles, Joint, PerArm, PoseAngles, PoseLandmarks};
use serde::{Deserialize, Serialize};

use crate::{AccuracyLevel, NO_POSE_MESSAGE};

/// Feedback for one joint position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointFeedback {
    pub joint: Joint,
    pub arm: Arm,
    /// Distance from the baseline, in normalized units
    pub deviation: f64,
    pub is_accurate: bool,
    pub message: String,
}

/// Feedback for one angle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleFeedback {
    pub baseline: f64,
    pub current: f64,
    pub deviation: f64,
    pub is_accurate: bool,
    pub message: String,
}

/// Angle feedback for both arms
pub type AngleFeedbackSet = PerArm<ArmAngles<AngleFeedback>>;

/// Scores and live measurements behind a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailedReport {
    Scored {
        position_scores: Vec<f64>,
        angle_scores: Vec<f64>,
        normalized_landmarks: PoseLandmarks,
        current_angles: PoseAngles,
    },
    Error {
        error: String,
    },
}

/// Full outcome of comparing one live pose against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Percentage in [0, 100]
    pub overall_accuracy: f64,
    pub accuracy_level: AccuracyLevel,
    pub is_accurate: bool,
    pub joint_feedback: Vec<JointFeedback>,
    pub angle_feedback: AngleFeedbackSet,
    pub summary_message: String,
    pub detailed_report: DetailedReport,
}

impl ComparisonResult {
    /// Result for a detection with no pose; nothing is scored
    pub fn invalid() -> Self {
        ComparisonResult {
            overall_accuracy: 0.0,
            accuracy_level: AccuracyLevel::Invalid,
            is_accurate: false,
            joint_feedback: Vec::new(),
            angle_feedback: AngleFeedbackSet::default(),
            summary_message: NO_POSE_MESSAGE.to_string(),
            detailed_report: DetailedReport::Error {
                error: "No pose detected".to_string(),
            },
        }
    }

    /// Joints that missed their threshold, in evaluation order
    pub fn inaccurate_joints(&self) -> impl Iterator<Item = &JointFeedback> {
        self.joint_feedback.iter().filter(|fb| !fb.is_accurate)
    }

    /// Compact pass/fail record for callers
    pub fn flag(&self) -> ComparisonFlag {
        ComparisonFlag {
            is_accurate: self.is_accurate,
            accuracy_percentage: round2(self.overall_accuracy),
            accuracy_level: self.accuracy_level,
            message: self.summary_message.clone(),
            needs_correction: !self.is_accurate,
            corrections: self
                .inaccurate_joints()
                .map(|fb| Correction {
                    joint: fb.joint,
                    arm: fb.arm,
                    message: fb.message.clone(),
                })
                .collect(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Correction for one inaccurate joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub joint: Joint,
    pub arm: Arm,
    pub message: String,
}

/// Comparison flag record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonFlag {
    pub is_accurate: bool,
    /// Overall accuracy rounded to two decimals
    pub accuracy_percentage: f64,
    pub accuracy_level: AccuracyLevel,
    pub message: String,
    pub needs_correction: bool,
    pub corrections: Vec<Correction>,
}
