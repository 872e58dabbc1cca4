//! Deviation scoring against baseline statistics
//!
//! A field is scored only when it is present in both the live sample and
//! the baseline. Thresholds widen to two standard deviations of the
//! baseline when the reference samples themselves were that spread out.

use formcheck_core::{
    AngleKind, AngleStat, AngleStats, Arm, Joint, JointStat, LandmarkStats, ReferenceSample,
};

use crate::ComparisonConfig;

/// Standard deviations of baseline spread tolerated before a threshold applies
pub const SPREAD_FACTOR: f64 = 2.0;

/// Score in [0, 100] for a deviation under a threshold.
///
/// A zero threshold only accepts a zero deviation.
pub fn score(deviation: f64, threshold: f64) -> f64 {
    if threshold > 0.0 {
        (1.0 - deviation / threshold).max(0.0) * 100.0
    } else if deviation == 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Position threshold widened by the baseline joint's spread
pub fn effective_position_threshold(position_threshold: f64, stat: &JointStat) -> f64 {
    match stat.spread() {
        Some(spread) => position_threshold.max(SPREAD_FACTOR * spread),
        None => position_threshold,
    }
}

/// Angle threshold widened by the baseline angle's spread
pub fn effective_angle_threshold(angle_threshold: f64, stat: &AngleStat) -> f64 {
    angle_threshold.max(SPREAD_FACTOR * stat.std)
}

/// Position deviation of one joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDeviation {
    pub arm: Arm,
    pub joint: Joint,
    /// Live minus baseline, horizontal
    pub dx: f64,
    /// Live minus baseline, vertical
    pub dy: f64,
    pub deviation: f64,
    pub threshold: f64,
    pub is_accurate: bool,
    pub score: f64,
}

/// Deviation of one angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleDeviation {
    pub arm: Arm,
    pub kind: AngleKind,
    pub baseline: f64,
    pub current: f64,
    pub deviation: f64,
    pub threshold: f64,
    pub is_accurate: bool,
    pub score: f64,
}

/// Every scored field of one comparison, in evaluation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deviations {
    pub joints: Vec<JointDeviation>,
    pub angles: Vec<AngleDeviation>,
}

impl Deviations {
    pub fn position_scores(&self) -> Vec<f64> {
        self.joints.iter().map(|j| j.score).collect()
    }

    pub fn angle_scores(&self) -> Vec<f64> {
        self.angles.iter().map(|a| a.score).collect()
    }

    /// Joint scores followed by angle scores
    pub fn pooled_scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.joints
            .iter()
            .map(|j| j.score)
            .chain(self.angles.iter().map(|a| a.score))
    }

    /// Number of scored fields
    pub fn len(&self) -> usize {
        self.joints.len() + self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty() && self.angles.is_empty()
    }
}

/// Deviation scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviationScorer {
    config: ComparisonConfig,
}

impl DeviationScorer {
    pub fn new(config: ComparisonConfig) -> Self {
        DeviationScorer { config }
    }

    /// Score a live sample against baseline statistics.
    ///
    /// Arms are visited left then right; joints shoulder, elbow, wrist;
    /// then angles elbow before shoulder.
    pub fn score(&self, live: &ReferenceSample, landmarks: &LandmarkStats, angles: &AngleStats) -> Deviations {
        let mut deviations = Deviations::default();

        for &arm in Arm::all() {
            for &joint in Joint::all() {
                let (Some(base), Some(current)) = (landmarks.joint(arm, joint), live.landmarks.joint(arm, joint))
                else {
                    continue;
                };

                let dx = current.x - base.x;
                let dy = current.y - base.y;
                let deviation = current.distance_to(base.x, base.y);
                let threshold = effective_position_threshold(self.config.position_threshold, base);

                deviations.joints.push(JointDeviation {
                    arm,
                    joint,
                    dx,
                    dy,
                    deviation,
                    threshold,
                    is_accurate: deviation <= threshold,
                    score: score(deviation, threshold),
                });
            }
        }

        for &arm in Arm::all() {
            for &kind in AngleKind::all() {
                let (Some(base), Some(&current)) = (angles.get(arm).get(kind), live.angles.get(arm).get(kind))
                else {
                    continue;
                };

                let deviation = (current - base.value).abs();
                let threshold = effective_angle_threshold(self.config.angle_threshold, base);

                deviations.angles.push(AngleDeviation {
                    arm,
                    kind,
                    baseline: base.value,
                    current,
                    deviation,
                    threshold,
                    is_accurate: deviation <= threshold,
                    score: score(deviation, threshold),
                });
            }
        }

        deviations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::{ArmAngles, ArmJoints, JointSample, PerArm, PoseAngles, PoseLandmarks};
    use proptest::prelude::*;

    fn stat(x: f64, y: f64, std: Option<f64>) -> JointStat {
        JointStat {
            x,
            y,
            visibility: 1.0,
            std_x: std,
            std_y: std,
        }
    }

    fn full_arm_stats() -> ArmJoints<JointStat> {
        ArmJoints::new()
            .with(Joint::Shoulder, stat(0.5, 0.3, None))
            .with(Joint::Elbow, stat(0.5, 0.5, None))
            .with(Joint::Wrist, stat(0.7, 0.5, None))
    }

    fn live_arm() -> ArmJoints<JointSample> {
        ArmJoints::new()
            .with(Joint::Shoulder, JointSample::at(0.5, 0.3))
            .with(Joint::Elbow, JointSample::at(0.5, 0.5))
            .with(Joint::Wrist, JointSample::at(0.7, 0.5))
    }

    #[test]
    fn test_score_degenerate_threshold() {
        assert_eq!(score(0.0, 0.0), 100.0);
        assert_eq!(score(0.001, 0.0), 0.0);
        assert_eq!(score(0.0, 0.1), 100.0);
        assert_eq!(score(0.2, 0.1), 0.0);
    }

    #[test]
    fn test_effective_thresholds() {
        assert_eq!(effective_position_threshold(0.1, &stat(0.0, 0.0, None)), 0.1);
        // spread = sqrt(0.06² + 0.06²) ≈ 0.0849, doubled ≈ 0.17
        let widened = effective_position_threshold(0.1, &stat(0.0, 0.0, Some(0.06)));
        assert!((widened - 2.0 * (0.0072f64).sqrt()).abs() < 1e-12);

        let partial = JointStat {
            std_y: None,
            ..stat(0.0, 0.0, Some(0.5))
        };
        assert_eq!(effective_position_threshold(0.1, &partial), 0.1);

        assert_eq!(effective_angle_threshold(15.0, &AngleStat::new(90.0, 10.0)), 20.0);
        assert_eq!(effective_angle_threshold(15.0, &AngleStat::new(90.0, 5.0)), 15.0);
    }

    #[test]
    fn test_angle_within_threshold() {
        let angles: AngleStats = PerArm::new(
            ArmAngles::new().with(AngleKind::ElbowAngle, AngleStat::exact(90.0)),
            ArmAngles::new(),
        );
        let live = ReferenceSample::new(
            PoseLandmarks::default(),
            PoseAngles::new(ArmAngles::new().with(AngleKind::ElbowAngle, 100.0), ArmAngles::new()),
        );

        let deviations = DeviationScorer::default().score(&live, &LandmarkStats::default(), &angles);
        assert_eq!(deviations.len(), 1);

        let elbow = deviations.angles[0];
        assert_eq!(elbow.deviation, 10.0);
        assert!(elbow.is_accurate);
        assert!((elbow.score - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let mut base_left = full_arm_stats();
        base_left.remove(Joint::Shoulder);
        let landmarks = PerArm::new(base_left, full_arm_stats());

        let mut live_left = live_arm();
        live_left.remove(Joint::Elbow);
        live_left.remove(Joint::Wrist);
        let live = ReferenceSample::new(PerArm::new(live_left, live_arm()), PoseAngles::default());

        let deviations = DeviationScorer::default().score(&live, &landmarks, &AngleStats::default());
        assert!(deviations.joints.iter().all(|j| j.arm == Arm::RightArm));
        assert_eq!(deviations.joints.len(), 3);
    }

    #[test]
    fn test_evaluation_order() {
        let landmarks = PerArm::new(full_arm_stats(), full_arm_stats());
        let live = ReferenceSample::new(PerArm::new(live_arm(), live_arm()), PoseAngles::default());

        let deviations = DeviationScorer::default().score(&live, &landmarks, &AngleStats::default());
        let order: Vec<_> = deviations.joints.iter().map(|j| (j.arm, j.joint)).collect();
        assert_eq!(
            order,
            vec![
                (Arm::LeftArm, Joint::Shoulder),
                (Arm::LeftArm, Joint::Elbow),
                (Arm::LeftArm, Joint::Wrist),
                (Arm::RightArm, Joint::Shoulder),
                (Arm::RightArm, Joint::Elbow),
                (Arm::RightArm, Joint::Wrist),
            ]
        );
        assert!(deviations.pooled_scores().all(|s| s == 100.0));
    }

    #[test]
    fn test_direction_components() {
        let landmarks = PerArm::new(full_arm_stats(), ArmJoints::new());
        let mut left = live_arm();
        left.set(Joint::Wrist, JointSample::at(0.75, 0.45));
        let live = ReferenceSample::new(PerArm::new(left, ArmJoints::new()), PoseAngles::default());

        let deviations = DeviationScorer::default().score(&live, &landmarks, &AngleStats::default());
        let wrist = deviations.joints[2];
        assert!((wrist.dx - 0.05).abs() < 1e-12);
        assert!((wrist.dy + 0.05).abs() < 1e-12);
        assert!((wrist.deviation - 0.005f64.sqrt()).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_score_bounded(deviation in 0.0f64..1000.0, threshold in 0.0f64..100.0) {
            let s = score(deviation, threshold);
            prop_assert!((0.0..=100.0).contains(&s));
            if deviation > threshold {
                prop_assert_eq!(s, 0.0);
            }
        }
    }
}
