//! Baseline aggregation - combining reference samples into statistics
//!
//! Every statistic is computed over the samples in which that field is
//! present. A joint missing from some samples contributes nothing for those
//! samples; it is never counted as zero.

use formcheck_core::{
    AggregateMethod, AngleKind, AngleStat, AngleStats, Arm, Baseline, BaselineMetadata, FormError,
    FormResult, Joint, JointStat, LandmarkStats, Reference, ReferenceSample,
};

use crate::{summarize, Center};

/// Result of aggregating reference samples
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// One statistic per joint and angle
    Reduced {
        landmarks: LandmarkStats,
        angles: AngleStats,
    },
    /// Samples kept verbatim
    Retained(Vec<ReferenceSample>),
}

/// Baseline aggregator
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineAggregator {
    method: AggregateMethod,
}

impl BaselineAggregator {
    pub fn new(method: AggregateMethod) -> Self {
        BaselineAggregator { method }
    }

    pub fn method(&self) -> AggregateMethod {
        self.method
    }

    /// Aggregate samples in collection order.
    ///
    /// Fails with [`FormError::NoSamples`] when `samples` is empty.
    pub fn aggregate(&self, samples: &[ReferenceSample]) -> FormResult<Aggregate> {
        let first = samples.first().ok_or(FormError::NoSamples)?;

        let aggregate = match self.method {
            AggregateMethod::First => Aggregate::Reduced {
                landmarks: first
                    .landmarks
                    .map(|_, arm| arm.map(|_, joint| JointStat::from_sample(joint))),
                angles: first
                    .angles
                    .map(|_, arm| arm.map(|_, value| AngleStat::exact(*value))),
            },
            AggregateMethod::All => Aggregate::Retained(samples.to_vec()),
            AggregateMethod::Average => reduced(samples, Center::Mean),
            AggregateMethod::Median => reduced(samples, Center::Median),
        };

        Ok(aggregate)
    }

    /// Aggregate samples and wrap them in a baseline record.
    ///
    /// The record's method and sample count are taken from this aggregator
    /// and `samples`, overriding whatever `metadata` carried. Reducing
    /// methods keep the inputs as `individual_samples`; `all` already stores
    /// them as the baseline itself.
    pub fn build(&self, mut metadata: BaselineMetadata, samples: Vec<ReferenceSample>) -> FormResult<Baseline> {
        let aggregate = self.aggregate(&samples)?;
        metadata.aggregate_method = self.method;
        metadata.num_images_processed = samples.len();

        match aggregate {
            Aggregate::Reduced { landmarks, angles } => Ok(Baseline {
                metadata,
                baseline_landmarks: Reference::Reduced(landmarks),
                baseline_angles: Reference::Reduced(angles),
                individual_samples: Some(samples),
            }),
            Aggregate::Retained(retained) => {
                let (landmarks, angles) = retained
                    .into_iter()
                    .map(|sample| (sample.landmarks, sample.angles))
                    .unzip();
                Ok(Baseline {
                    metadata,
                    baseline_landmarks: Reference::Retained(landmarks),
                    baseline_angles: Reference::Retained(angles),
                    individual_samples: None,
                })
            }
        }
    }
}

fn reduced(samples: &[ReferenceSample], center: Center) -> Aggregate {
    let (landmarks, angles) = reduce(samples, center);
    Aggregate::Reduced { landmarks, angles }
}

fn reduce(samples: &[ReferenceSample], center: Center) -> (LandmarkStats, AngleStats) {
    let mut landmarks = LandmarkStats::default();
    let mut angles = AngleStats::default();

    for &arm in Arm::all() {
        for &joint in Joint::all() {
            let present: Vec<_> = samples
                .iter()
                .filter_map(|s| s.landmarks.joint(arm, joint))
                .collect();

            let xs: Vec<f64> = present.iter().map(|j| j.x).collect();
            let ys: Vec<f64> = present.iter().map(|j| j.y).collect();
            let vis: Vec<f64> = present.iter().map(|j| j.visibility).collect();

            if let (Some(x), Some(y), Some(v)) = (
                summarize(&xs, center),
                summarize(&ys, center),
                summarize(&vis, center),
            ) {
                landmarks.get_mut(arm).set(
                    joint,
                    JointStat {
                        x: x.center,
                        y: y.center,
                        visibility: v.center,
                        std_x: Some(x.std),
                        std_y: Some(y.std),
                    },
                );
            }
        }

        for &kind in AngleKind::all() {
            let values: Vec<f64> = samples
                .iter()
                .filter_map(|s| s.angles.get(arm).get(kind).copied())
                .collect();

            if let Some(summary) = summarize(&values, center) {
                angles
                    .get_mut(arm)
                    .set(kind, AngleStat::new(summary.center, summary.std));
            }
        }
    }

    (landmarks, angles)
}

/// Statistics to score against.
///
/// A baseline that retained every sample is averaged here.
pub fn scoring_stats(baseline: &Baseline) -> FormResult<(LandmarkStats, AngleStats)> {
    if let Some((landmarks, angles)) = baseline.stats() {
        return Ok((landmarks.clone(), angles.clone()));
    }

    let samples = baseline.retained_samples().unwrap_or_default();
    if samples.is_empty() {
        return Err(FormError::NoSamples);
    }
    Ok(reduce(&samples, Center::Mean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use formcheck_core::{ArmAngles, ArmJoints, JointSample, PoseAngles, PoseLandmarks};

    fn sample(left_shoulder: Option<(f64, f64)>, left_elbow_angle: Option<f64>) -> ReferenceSample {
        let mut arm = ArmJoints::new();
        if let Some((x, y)) = left_shoulder {
            arm.set(Joint::Shoulder, JointSample::new(x, y, 0.9));
        }
        let mut arm_angles = ArmAngles::new();
        if let Some(value) = left_elbow_angle {
            arm_angles.set(AngleKind::ElbowAngle, value);
        }
        ReferenceSample::new(
            PoseLandmarks::new(arm, ArmJoints::new()),
            PoseAngles::new(arm_angles, ArmAngles::new()),
        )
    }

    fn metadata(method: AggregateMethod, count: usize) -> BaselineMetadata {
        BaselineMetadata {
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
            source_folder: "refs".to_string(),
            num_images_processed: count,
            processed_files: (0..count).map(|i| format!("{i}.json")).collect(),
            aggregate_method: method,
        }
    }

    fn unwrap_reduced(aggregate: Aggregate) -> (LandmarkStats, AngleStats) {
        match aggregate {
            Aggregate::Reduced { landmarks, angles } => (landmarks, angles),
            Aggregate::Retained(_) => panic!("expected reduced aggregate"),
        }
    }

    #[test]
    fn test_zero_samples_fails() {
        let err = BaselineAggregator::new(AggregateMethod::Average)
            .aggregate(&[])
            .unwrap_err();
        assert!(matches!(err, FormError::NoSamples));
    }

    #[test]
    fn test_single_sample_has_zero_spread() {
        for method in [AggregateMethod::Average, AggregateMethod::Median] {
            let samples = vec![sample(Some((0.4, 0.6)), Some(123.0))];
            let (landmarks, angles) = unwrap_reduced(BaselineAggregator::new(method).aggregate(&samples).unwrap());

            let shoulder = landmarks.joint(Arm::LeftArm, Joint::Shoulder).unwrap();
            assert_eq!((shoulder.x, shoulder.y), (0.4, 0.6));
            assert_eq!((shoulder.std_x, shoulder.std_y), (Some(0.0), Some(0.0)));
            assert_eq!(angles.left_arm.elbow_angle, Some(AngleStat::new(123.0, 0.0)));
        }
    }

    #[test]
    fn test_average_angles() {
        let samples: Vec<_> = [10.0, 20.0, 30.0]
            .iter()
            .map(|&v| sample(None, Some(v)))
            .collect();
        let (_, angles) = unwrap_reduced(
            BaselineAggregator::new(AggregateMethod::Average)
                .aggregate(&samples)
                .unwrap(),
        );

        let stat = angles.left_arm.elbow_angle.unwrap();
        assert!((stat.value - 20.0).abs() < 1e-12);
        assert!((stat.std - 8.165).abs() < 1e-3);
    }

    #[test]
    fn test_absent_fields_do_not_bias_statistics() {
        let samples = vec![
            sample(Some((0.2, 0.2)), None),
            sample(None, Some(90.0)),
            sample(Some((0.4, 0.4)), None),
        ];
        let (landmarks, angles) = unwrap_reduced(
            BaselineAggregator::new(AggregateMethod::Average)
                .aggregate(&samples)
                .unwrap(),
        );

        let shoulder = landmarks.joint(Arm::LeftArm, Joint::Shoulder).unwrap();
        assert!((shoulder.x - 0.3).abs() < 1e-12);
        assert!((shoulder.std_x.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(angles.left_arm.elbow_angle, Some(AngleStat::new(90.0, 0.0)));
        assert!(landmarks.joint(Arm::LeftArm, Joint::Elbow).is_none());
        assert!(angles.right_arm.is_empty());
    }

    #[test]
    fn test_median_uses_middle_value() {
        let samples: Vec<_> = [0.1, 0.9, 0.2]
            .iter()
            .map(|&x| sample(Some((x, 0.5)), None))
            .collect();
        let (landmarks, _) = unwrap_reduced(
            BaselineAggregator::new(AggregateMethod::Median)
                .aggregate(&samples)
                .unwrap(),
        );

        let shoulder = landmarks.joint(Arm::LeftArm, Joint::Shoulder).unwrap();
        assert_eq!(shoulder.x, 0.2);
        assert!(shoulder.std_x.unwrap() > 0.0);
    }

    #[test]
    fn test_first_is_verbatim_without_statistics() {
        let samples = vec![sample(Some((0.1, 0.2)), Some(45.0)), sample(Some((0.9, 0.9)), Some(170.0))];
        let (landmarks, angles) = unwrap_reduced(
            BaselineAggregator::new(AggregateMethod::First)
                .aggregate(&samples)
                .unwrap(),
        );

        let shoulder = landmarks.joint(Arm::LeftArm, Joint::Shoulder).unwrap();
        assert_eq!((shoulder.x, shoulder.y), (0.1, 0.2));
        assert!(shoulder.spread().is_none());
        assert_eq!(angles.left_arm.elbow_angle, Some(AngleStat::exact(45.0)));
    }

    #[test]
    fn test_all_retains_samples_and_omits_individual_samples() {
        let samples = vec![sample(Some((0.1, 0.2)), None), sample(Some((0.3, 0.4)), None)];
        let baseline = BaselineAggregator::new(AggregateMethod::All)
            .build(metadata(AggregateMethod::All, 2), samples.clone())
            .unwrap();

        baseline.check_consistency().unwrap();
        assert!(baseline.individual_samples.is_none());
        assert_eq!(baseline.retained_samples().unwrap(), samples);
    }

    #[test]
    fn test_reduced_build_keeps_individual_samples() {
        let samples = vec![sample(Some((0.1, 0.2)), None), sample(Some((0.3, 0.4)), None)];
        let baseline = BaselineAggregator::new(AggregateMethod::Median)
            .build(metadata(AggregateMethod::Median, 2), samples.clone())
            .unwrap();

        baseline.check_consistency().unwrap();
        assert_eq!(baseline.individual_samples, Some(samples));
    }

    #[test]
    fn test_build_stamps_method_and_count() {
        let samples = vec![sample(Some((0.1, 0.2)), Some(80.0)); 3];
        for method in [AggregateMethod::Average, AggregateMethod::All] {
            let baseline = BaselineAggregator::new(method)
                .build(metadata(AggregateMethod::First, 7), samples.clone())
                .unwrap();

            assert_eq!(baseline.method(), method);
            assert_eq!(baseline.metadata.num_images_processed, 3);
            baseline.check_consistency().unwrap();
        }
    }

    #[test]
    fn test_scoring_stats_averages_retained_samples() {
        let samples = vec![sample(Some((0.1, 0.2)), None), sample(Some((0.3, 0.4)), None)];
        let baseline = BaselineAggregator::new(AggregateMethod::All)
            .build(metadata(AggregateMethod::All, 2), samples)
            .unwrap();

        let (landmarks, _) = scoring_stats(&baseline).unwrap();
        let shoulder = landmarks.joint(Arm::LeftArm, Joint::Shoulder).unwrap();
        assert!((shoulder.x - 0.2).abs() < 1e-12);
        assert!((shoulder.y - 0.3).abs() < 1e-12);
    }
}
