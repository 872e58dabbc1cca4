//! Accuracy pooling and severity levels

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Deviations;

/// Severity of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    /// No pose was detected; nothing was scored
    Invalid,
}

impl AccuracyLevel {
    /// Level for an overall accuracy; lower bounds are inclusive
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 90.0 {
            AccuracyLevel::Excellent
        } else if accuracy >= 75.0 {
            AccuracyLevel::Good
        } else if accuracy >= 50.0 {
            AccuracyLevel::Fair
        } else {
            AccuracyLevel::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccuracyLevel::Excellent => "excellent",
            AccuracyLevel::Good => "good",
            AccuracyLevel::Fair => "fair",
            AccuracyLevel::Poor => "poor",
            AccuracyLevel::Invalid => "invalid",
        }
    }
}

impl fmt::Display for AccuracyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mean of pooled scores, 0 when nothing was scored
pub fn overall_accuracy(scores: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Overall verdict for one comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub overall_accuracy: f64,
    pub level: AccuracyLevel,
    /// Judged against the configured accuracy threshold, not the level
    pub is_accurate: bool,
}

/// Accuracy classifier
#[derive(Debug, Clone, Copy)]
pub struct AccuracyClassifier {
    accuracy_threshold: f64,
}

impl AccuracyClassifier {
    pub fn new(accuracy_threshold: f64) -> Self {
        AccuracyClassifier { accuracy_threshold }
    }

    pub fn classify_accuracy(&self, overall_accuracy: f64) -> Classification {
        Classification {
            overall_accuracy,
            level: AccuracyLevel::from_accuracy(overall_accuracy),
            is_accurate: overall_accuracy >= self.accuracy_threshold,
        }
    }

    pub fn classify(&self, deviations: &Deviations) -> Classification {
        self.classify_accuracy(overall_accuracy(deviations.pooled_scores()))
    }
}
