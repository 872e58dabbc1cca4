//! Correction messages

use formcheck_core::AngleKind;

use crate::{
    AngleDeviation, AngleFeedback, AngleFeedbackSet, Classification, Deviations, JointDeviation,
    JointFeedback,
};

/// Offsets at or below this, in normalized units, get no direction hint
pub const DIRECTION_HINT_THRESHOLD: f64 = 0.02;

/// Issues quoted in a summary
pub const MAX_SUMMARY_ISSUES: usize = 3;

pub const NO_POSE_MESSAGE: &str = "No pose detected in image";

/// Direction hint for a joint offset, live minus baseline
pub fn direction(dx: f64, dy: f64) -> String {
    let mut parts = Vec::with_capacity(2);
    if dx.abs() > DIRECTION_HINT_THRESHOLD {
        parts.push(if dx > 0.0 { "left" } else { "right" });
    }
    if dy.abs() > DIRECTION_HINT_THRESHOLD {
        parts.push(if dy > 0.0 { "down" } else { "up" });
    }

    if parts.is_empty() {
        "slightly".to_string()
    } else {
        parts.join(" and ")
    }
}

pub fn joint_message(deviation: &JointDeviation) -> String {
    if deviation.is_accurate {
        format!("{} position is correct", deviation.joint.label())
    } else {
        format!(
            "Adjust {}: move {}",
            deviation.joint,
            direction(deviation.dx, deviation.dy)
        )
    }
}

pub fn angle_message(deviation: &AngleDeviation) -> String {
    let (subject, verb) = match deviation.kind {
        AngleKind::ElbowAngle => (
            "elbow",
            if deviation.current > deviation.baseline { "decrease" } else { "increase" },
        ),
        AngleKind::ShoulderAngle => (
            "shoulder",
            if deviation.current > deviation.baseline { "lower" } else { "raise" },
        ),
    };

    if deviation.is_accurate {
        format!("{} angle is correct", capitalize(subject))
    } else {
        format!("Adjust {subject} angle: {verb} by {:.1}°", deviation.deviation)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Per-joint feedback in evaluation order
pub fn joint_feedback(deviations: &[JointDeviation]) -> Vec<JointFeedback> {
    deviations
        .iter()
        .map(|d| JointFeedback {
            joint: d.joint,
            arm: d.arm,
            deviation: d.deviation,
            is_accurate: d.is_accurate,
            message: joint_message(d),
        })
        .collect()
}

/// Per-angle feedback keyed by arm
pub fn angle_feedback(deviations: &[AngleDeviation]) -> AngleFeedbackSet {
    let mut feedback = AngleFeedbackSet::default();
    for d in deviations {
        feedback.get_mut(d.arm).set(
            d.kind,
            AngleFeedback {
                baseline: d.baseline,
                current: d.current,
                deviation: d.deviation,
                is_accurate: d.is_accurate,
                message: angle_message(d),
            },
        );
    }
    feedback
}

/// One-line verdict
pub fn summary_message<'a>(verdict: &Classification, issues: impl IntoIterator<Item = &'a str>) -> String {
    let accuracy = verdict.overall_accuracy;
    if verdict.is_accurate {
        return format!("Great form! Accuracy: {accuracy:.1}%");
    }

    let issues: Vec<&str> = issues.into_iter().take(MAX_SUMMARY_ISSUES).collect();
    if issues.is_empty() {
        format!("Accuracy: {accuracy:.1}%")
    } else {
        format!("Accuracy: {accuracy:.1}%. Issues: {}", issues.join("; "))
    }
}

/// Feedback generator output for one comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub joints: Vec<JointFeedback>,
    pub angles: AngleFeedbackSet,
    pub summary: String,
}

/// Build every message for a scored comparison.
///
/// The summary quotes unmet joints first, then unmet angles.
pub fn generate_feedback(deviations: &Deviations, verdict: &Classification) -> Feedback {
    let joints = joint_feedback(&deviations.joints);
    let angles = angle_feedback(&deviations.angles);

    let joint_issues = joints
        .iter()
        .filter(|fb| !fb.is_accurate)
        .map(|fb| fb.message.as_str());
    let angle_issues = angles
        .iter()
        .flat_map(|(_, arm)| arm.iter())
        .filter(|(_, fb)| !fb.is_accurate)
        .map(|(_, fb)| fb.message.as_str());
    let summary = summary_message(verdict, joint_issues.chain(angle_issues));

    Feedback {
        joints,
        angles,
        summary,
    }
}
