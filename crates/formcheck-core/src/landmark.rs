//! Arm landmarks - joint positions grouped per arm
//!
//! The detection service drops joints whose visibility falls below
//! [`VISIBILITY_FLOOR`], so every joint slot is an `Option`. A joint is
//! either present with coordinates or absent; there is no zero placeholder.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visibility below which the detection service omits a joint
pub const VISIBILITY_FLOOR: f64 = 0.5;

fn default_visibility() -> f64 {
    1.0
}

/// Arm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arm {
    LeftArm,
    RightArm,
}

impl Arm {
    /// All arms in evaluation order
    pub fn all() -> &'static [Arm] {
        &[Arm::LeftArm, Arm::RightArm]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Arm::LeftArm => "left_arm",
            Arm::RightArm => "right_arm",
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joint identifier within one arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Shoulder,
    Elbow,
    Wrist,
}

impl Joint {
    /// All joints in evaluation order
    pub fn all() -> &'static [Joint] {
        &[Joint::Shoulder, Joint::Elbow, Joint::Wrist]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Joint::Shoulder => "shoulder",
            Joint::Elbow => "elbow",
            Joint::Wrist => "wrist",
        }
    }

    /// Capitalized name for user-facing messages
    pub fn label(self) -> &'static str {
        match self {
            Joint::Shoulder => "Shoulder",
            Joint::Elbow => "Elbow",
            Joint::Wrist => "Wrist",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joint position in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointSample {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

impl JointSample {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    /// Fully visible joint
    pub fn at(x: f64, y: f64) -> Self {
        Self::new(x, y, 1.0)
    }

    /// Euclidean distance to a point
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Joint position in pixel coordinates, as reported by detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelJoint {
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

impl PixelJoint {
    pub fn new(x: i32, y: i32, visibility: f64) -> Self {
        Self { x, y, visibility }
    }
}

/// The three joints of one arm, each optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmJoints<J> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoulder: Option<J>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elbow: Option<J>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrist: Option<J>,
}

impl<J> Default for ArmJoints<J> {
    fn default() -> Self {
        Self {
            shoulder: None,
            elbow: None,
            wrist: None,
        }
    }
}

impl<J> ArmJoints<J> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a joint by kind
    pub fn get(&self, joint: Joint) -> Option<&J> {
        match joint {
            Joint::Shoulder => self.shoulder.as_ref(),
            Joint::Elbow => self.elbow.as_ref(),
            Joint::Wrist => self.wrist.as_ref(),
        }
    }

    fn slot_mut(&mut self, joint: Joint) -> &mut Option<J> {
        match joint {
            Joint::Shoulder => &mut self.shoulder,
            Joint::Elbow => &mut self.elbow,
            Joint::Wrist => &mut self.wrist,
        }
    }

    /// Insert or replace a joint
    pub fn set(&mut self, joint: Joint, value: J) {
        *self.slot_mut(joint) = Some(value);
    }

    /// Remove a joint, returning it if it was present
    pub fn remove(&mut self, joint: Joint) -> Option<J> {
        self.slot_mut(joint).take()
    }

    /// Builder form of [`ArmJoints::set`]
    pub fn with(mut self, joint: Joint, value: J) -> Self {
        self.set(joint, value);
        self
    }

    /// Iterate over present joints in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (Joint, &J)> {
        Joint::all()
            .iter()
            .filter_map(move |&joint| self.get(joint).map(|value| (joint, value)))
    }

    /// Number of present joints
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.shoulder.is_none() && self.elbow.is_none() && self.wrist.is_none()
    }

    /// Transform every present joint, keeping absent ones absent
    pub fn map<K>(&self, mut f: impl FnMut(Joint, &J) -> K) -> ArmJoints<K> {
        ArmJoints {
            shoulder: self.shoulder.as_ref().map(|j| f(Joint::Shoulder, j)),
            elbow: self.elbow.as_ref().map(|j| f(Joint::Elbow, j)),
            wrist: self.wrist.as_ref().map(|j| f(Joint::Wrist, j)),
        }
    }
}

/// A value for each arm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerArm<T> {
    #[serde(default)]
    pub left_arm: T,
    #[serde(default)]
    pub right_arm: T,
}

impl<T> PerArm<T> {
    pub fn new(left_arm: T, right_arm: T) -> Self {
        Self {
            left_arm,
            right_arm,
        }
    }

    pub fn get(&self, arm: Arm) -> &T {
        match arm {
            Arm::LeftArm => &self.left_arm,
            Arm::RightArm => &self.right_arm,
        }
    }

    pub fn get_mut(&mut self, arm: Arm) -> &mut T {
        match arm {
            Arm::LeftArm => &mut self.left_arm,
            Arm::RightArm => &mut self.right_arm,
        }
    }

    /// Iterate over both arms in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (Arm, &T)> {
        Arm::all().iter().map(move |&arm| (arm, self.get(arm)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Arm, &T) -> U) -> PerArm<U> {
        PerArm {
            left_arm: f(Arm::LeftArm, &self.left_arm),
            right_arm: f(Arm::RightArm, &self.right_arm),
        }
    }
}

impl<J> PerArm<ArmJoints<J>> {
    /// Look up one joint of one arm
    pub fn joint(&self, arm: Arm, joint: Joint) -> Option<&J> {
        self.get(arm).get(joint)
    }

    /// Total number of present joints across both arms
    pub fn joint_count(&self) -> usize {
        self.left_arm.len() + self.right_arm.len()
    }
}

/// Normalized landmarks for both arms
pub type PoseLandmarks = PerArm<ArmJoints<JointSample>>;

/// Pixel-space landmarks for both arms
pub type PixelLandmarks = PerArm<ArmJoints<PixelJoint>>;

/// Dimensions of the image a detection was made on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Output of the landmark detection service for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub image: ImageSize,
    pub pose_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<PixelLandmarks>,
}

impl Detection {
    /// A detection with a pose
    pub fn new(image: ImageSize, landmarks: PixelLandmarks) -> Self {
        Self {
            image,
            pose_detected: true,
            landmarks: Some(landmarks),
        }
    }

    /// A detection where no body was found
    pub fn no_pose(image: ImageSize) -> Self {
        Self {
            image,
            pose_detected: false,
            landmarks: None,
        }
    }

    /// Landmarks, if a pose was detected
    pub fn pose(&self) -> Option<&PixelLandmarks> {
        if self.pose_detected {
            self.landmarks.as_ref()
        } else {
            None
        }
    }
}
