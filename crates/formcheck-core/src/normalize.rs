//! Landmark normalization - pixel to unit-square coordinates
//!
//! Coordinates are always divided by the dimensions of the image the
//! detection was made on, so samples taken at different resolutions are
//! directly comparable.

use crate::{FormError, FormResult, ImageSize, JointSample, PixelJoint, PixelLandmarks, PoseLandmarks};

impl ImageSize {
    /// Reject zero-sized images
    pub fn validate(self) -> FormResult<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(FormError::InvalidImageSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }
}

fn normalize_joint(joint: &PixelJoint, size: ImageSize) -> JointSample {
    JointSample {
        x: f64::from(joint.x) / f64::from(size.width),
        y: f64::from(joint.y) / f64::from(size.height),
        visibility: joint.visibility,
    }
}

fn denormalize_joint(joint: &JointSample, size: ImageSize) -> PixelJoint {
    PixelJoint {
        x: (joint.x * f64::from(size.width)).round() as i32,
        y: (joint.y * f64::from(size.height)).round() as i32,
        visibility: joint.visibility,
    }
}

/// Convert pixel landmarks into unit-square coordinates.
///
/// Absent joints stay absent; visibility passes through unchanged.
pub fn normalize(landmarks: &PixelLandmarks, size: ImageSize) -> FormResult<PoseLandmarks> {
    let size = size.validate()?;
    Ok(landmarks.map(|_, arm| arm.map(|_, joint| normalize_joint(joint, size))))
}

/// Inverse of [`normalize`] for the same image size
pub fn denormalize(landmarks: &PoseLandmarks, size: ImageSize) -> FormResult<PixelLandmarks> {
    let size = size.validate()?;
    Ok(landmarks.map(|_, arm| arm.map(|_, joint| denormalize_joint(joint, size))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arm, ArmJoints, Joint, PerArm};
    use proptest::prelude::*;

    fn pixel_arm(shoulder: (i32, i32), elbow: (i32, i32), wrist: (i32, i32)) -> ArmJoints<PixelJoint> {
        ArmJoints::new()
            .with(Joint::Shoulder, PixelJoint::new(shoulder.0, shoulder.1, 0.9))
            .with(Joint::Elbow, PixelJoint::new(elbow.0, elbow.1, 0.8))
            .with(Joint::Wrist, PixelJoint::new(wrist.0, wrist.1, 0.7))
    }

    #[test]
    fn test_normalize_divides_by_image_size() {
        let landmarks = PerArm::new(pixel_arm((320, 240), (160, 120), (0, 480)), ArmJoints::new());
        let normalized = normalize(&landmarks, ImageSize::new(640, 480)).unwrap();

        let shoulder = normalized.joint(Arm::LeftArm, Joint::Shoulder).unwrap();
        assert!((shoulder.x - 0.5).abs() < 1e-12);
        assert!((shoulder.y - 0.5).abs() < 1e-12);
        assert_eq!(shoulder.visibility, 0.9);

        let wrist = normalized.joint(Arm::LeftArm, Joint::Wrist).unwrap();
        assert_eq!(wrist.x, 0.0);
        assert_eq!(wrist.y, 1.0);
    }

    #[test]
    fn test_absent_joints_stay_absent() {
        let mut arm = pixel_arm((1, 1), (2, 2), (3, 3));
        arm.remove(Joint::Elbow);
        let landmarks = PerArm::new(arm, ArmJoints::new());

        let normalized = normalize(&landmarks, ImageSize::new(100, 100)).unwrap();
        assert!(normalized.joint(Arm::LeftArm, Joint::Elbow).is_none());
        assert_eq!(normalized.joint_count(), 2);
    }

    #[test]
    fn test_zero_size_rejected() {
        let landmarks = PerArm::new(pixel_arm((1, 1), (2, 2), (3, 3)), ArmJoints::new());
        let err = normalize(&landmarks, ImageSize::new(0, 480)).unwrap_err();
        assert!(matches!(err, FormError::InvalidImageSize { width: 0, height: 480 }));
    }

    proptest! {
        #[test]
        fn prop_normalize_round_trip(
            width in 1u32..4096,
            height in 1u32..4096,
            coords in proptest::collection::vec((-500i32..5000, -500i32..5000), 6),
        ) {
            let landmarks = PerArm::new(
                pixel_arm(coords[0], coords[1], coords[2]),
                pixel_arm(coords[3], coords[4], coords[5]),
            );
            let size = ImageSize::new(width, height);

            let normalized = normalize(&landmarks, size).unwrap();
            let restored = denormalize(&normalized, size).unwrap();

            prop_assert_eq!(restored, landmarks);
        }
    }
}
