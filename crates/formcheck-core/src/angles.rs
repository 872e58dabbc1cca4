//! Joint angles - elbow flexion and upper-arm elevation
//!
//! - Elbow angle: angle at the elbow between the upper arm and forearm,
//!   0° fully folded, 180° fully straight.
//! - Shoulder angle: direction of the upper arm measured from vertical,
//!   0° pointing straight down in image coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ArmJoints, JointSample, PerArm, PoseLandmarks};

/// Added to the magnitude product so a collapsed segment cannot divide by zero
pub const ANGLE_EPSILON: f64 = 1e-6;

/// Angle identifier within one arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleKind {
    ElbowAngle,
    ShoulderAngle,
}

impl AngleKind {
    /// All angles in evaluation order
    pub fn all() -> &'static [AngleKind] {
        &[AngleKind::ElbowAngle, AngleKind::ShoulderAngle]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AngleKind::ElbowAngle => "elbow_angle",
            AngleKind::ShoulderAngle => "shoulder_angle",
        }
    }

    /// Human-readable name ("elbow angle")
    pub fn label(self) -> &'static str {
        match self {
            AngleKind::ElbowAngle => "elbow angle",
            AngleKind::ShoulderAngle => "shoulder angle",
        }
    }
}

impl fmt::Display for AngleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Angles of one arm, each present only when its joints were detected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmAngles<A> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elbow_angle: Option<A>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoulder_angle: Option<A>,
}

impl<A> Default for ArmAngles<A> {
    fn default() -> Self {
        Self {
            elbow_angle: None,
            shoulder_angle: None,
        }
    }
}

impl<A> ArmAngles<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: AngleKind) -> Option<&A> {
        match kind {
            AngleKind::ElbowAngle => self.elbow_angle.as_ref(),
            AngleKind::ShoulderAngle => self.shoulder_angle.as_ref(),
        }
    }

    pub fn set(&mut self, kind: AngleKind, value: A) {
        match kind {
            AngleKind::ElbowAngle => self.elbow_angle = Some(value),
            AngleKind::ShoulderAngle => self.shoulder_angle = Some(value),
        }
    }

    pub fn with(mut self, kind: AngleKind, value: A) -> Self {
        self.set(kind, value);
        self
    }

    /// Iterate over present angles in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (AngleKind, &A)> {
        AngleKind::all()
            .iter()
            .filter_map(move |&kind| self.get(kind).map(|value| (kind, value)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.elbow_angle.is_none() && self.shoulder_angle.is_none()
    }

    pub fn map<B>(&self, mut f: impl FnMut(AngleKind, &A) -> B) -> ArmAngles<B> {
        ArmAngles {
            elbow_angle: self.elbow_angle.as_ref().map(|a| f(AngleKind::ElbowAngle, a)),
            shoulder_angle: self.shoulder_angle.as_ref().map(|a| f(AngleKind::ShoulderAngle, a)),
        }
    }
}

impl<A> PerArm<ArmAngles<A>> {
    /// Total number of present angles across both arms
    pub fn angle_count(&self) -> usize {
        self.left_arm.len() + self.right_arm.len()
    }
}

/// Angles in degrees for both arms
pub type PoseAngles = PerArm<ArmAngles<f64>>;

/// Angle at the elbow formed by shoulder-elbow-wrist, in degrees [0, 180]
pub fn elbow_angle(shoulder: &JointSample, elbow: &JointSample, wrist: &JointSample) -> f64 {
    // Upper arm, pointing back to the shoulder
    let v1 = (shoulder.x - elbow.x, shoulder.y - elbow.y);
    // Forearm
    let v2 = (wrist.x - elbow.x, wrist.y - elbow.y);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    let cos_angle = (dot / (mag1 * mag2 + ANGLE_EPSILON)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Direction of the upper arm relative to vertical, in degrees (-180, 180].
///
/// The atan2 arguments are swapped on purpose so that 0° is the vertical axis.
pub fn shoulder_angle(shoulder: &JointSample, elbow: &JointSample) -> f64 {
    let dx = elbow.x - shoulder.x;
    let dy = elbow.y - shoulder.y;

    let angle = dx.atan2(dy).to_degrees();
    if angle <= -180.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Angles computable from one arm's present joints.
///
/// The elbow angle needs shoulder, elbow and wrist; the shoulder angle needs
/// only shoulder and elbow.
pub fn arm_angles(arm: &ArmJoints<JointSample>) -> ArmAngles<f64> {
    let mut angles = ArmAngles::new();

    if let (Some(shoulder), Some(elbow)) = (&arm.shoulder, &arm.elbow) {
        if let Some(wrist) = &arm.wrist {
            angles.elbow_angle = Some(elbow_angle(shoulder, elbow, wrist));
        }
        angles.shoulder_angle = Some(shoulder_angle(shoulder, elbow));
    }

    angles
}

/// Angles for both arms of a normalized pose
pub fn pose_angles(landmarks: &PoseLandmarks) -> PoseAngles {
    landmarks.map(|_, arm| arm_angles(arm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Joint;

    fn p(x: f64, y: f64) -> JointSample {
        JointSample::at(x, y)
    }

    #[test]
    fn test_straight_arm() {
        // The epsilon keeps a perfectly straight arm a fraction of a degree short of 180
        let angle = elbow_angle(&p(0.0, 0.0), &p(0.5, 0.0), &p(1.0, 0.0));
        assert!((angle - 180.0).abs() < 0.5);
    }

    #[test]
    fn test_bent_arm() {
        let angle = elbow_angle(&p(0.0, 0.0), &p(0.5, 0.0), &p(0.5, 0.5));
        assert!((angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_collapsed_segment_does_not_divide_by_zero() {
        let angle = elbow_angle(&p(0.5, 0.5), &p(0.5, 0.5), &p(0.7, 0.5));
        assert!(angle.is_finite());
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_shoulder_angle_from_vertical() {
        // Upper arm hanging straight down
        assert!(shoulder_angle(&p(0.5, 0.2), &p(0.5, 0.4)).abs() < 1e-9);
        // Upper arm pointing right
        assert!((shoulder_angle(&p(0.5, 0.2), &p(0.7, 0.2)) - 90.0).abs() < 1e-9);
        // Upper arm pointing left
        assert!((shoulder_angle(&p(0.5, 0.2), &p(0.3, 0.2)) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_shoulder_angle_straight_up_is_positive_180() {
        let angle = shoulder_angle(&p(0.5, 0.4), &p(0.5, 0.2));
        assert_eq!(angle, 180.0);
    }

    #[test]
    fn test_partial_arm_yields_only_shoulder_angle() {
        let arm = ArmJoints::new()
            .with(Joint::Shoulder, p(0.5, 0.2))
            .with(Joint::Elbow, p(0.5, 0.4));

        let angles = arm_angles(&arm);
        assert!(angles.elbow_angle.is_none());
        assert!(angles.shoulder_angle.is_some());
    }

    #[test]
    fn test_missing_shoulder_yields_no_angles() {
        let arm = ArmJoints::new()
            .with(Joint::Elbow, p(0.5, 0.4))
            .with(Joint::Wrist, p(0.6, 0.5));

        assert!(arm_angles(&arm).is_empty());
    }

    #[test]
    fn test_full_arm_yields_both_angles() {
        let arm = ArmJoints::new()
            .with(Joint::Shoulder, p(0.0, 0.0))
            .with(Joint::Elbow, p(0.0, 0.5))
            .with(Joint::Wrist, p(0.5, 0.5));

        let angles = arm_angles(&arm);
        assert!((angles.elbow_angle.unwrap() - 90.0).abs() < 0.01);
        assert!(angles.shoulder_angle.unwrap().abs() < 1e-9);
    }
}
