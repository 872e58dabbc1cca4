//! Batch baseline collection
//!
//! Detection records are fed in order. A record that cannot be used (no
//! pose, bad image size) is skipped and reported; collection only fails
//! when nothing usable was seen.

use std::fmt;

use chrono::{Local, NaiveDateTime};
use formcheck_core::{
    normalize, pose_angles, AggregateMethod, Baseline, BaselineMetadata, Detection, FormError,
    FormResult, ReferenceSample,
};

use crate::BaselineAggregator;

/// Source label for baselines built from one detection
pub const SINGLE_SAMPLE_SOURCE: &str = "single_image";

/// Normalize a detection and compute its angles.
///
/// Fails with [`FormError::NoPoseDetected`] when detection found no body.
pub fn extract_sample(detection: &Detection) -> FormResult<ReferenceSample> {
    let pixels = detection.pose().ok_or(FormError::NoPoseDetected)?;
    let landmarks = normalize(pixels, detection.image)?;
    let angles = pose_angles(&landmarks);
    Ok(ReferenceSample::new(landmarks, angles))
}

/// Why a record was left out of the baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoPose,
    InvalidImageSize { width: u32, height: u32 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoPose => write!(f, "no pose detected"),
            SkipReason::InvalidImageSize { width, height } => {
                write!(f, "invalid image size {width}x{height}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of a collection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Records that contributed a sample, in input order
    pub processed: Vec<String>,
    /// Records that were skipped, in input order
    pub skipped: Vec<SkippedRecord>,
}

impl CollectionReport {
    /// Total records seen
    pub fn total(&self) -> usize {
        self.processed.len() + self.skipped.len()
    }
}

/// Accumulates reference samples for one baseline
#[derive(Debug)]
pub struct BaselineCollector {
    aggregator: BaselineAggregator,
    source_folder: String,
    samples: Vec<ReferenceSample>,
    report: CollectionReport,
}

impl BaselineCollector {
    pub fn new(method: AggregateMethod) -> Self {
        Self {
            aggregator: BaselineAggregator::new(method),
            source_folder: String::new(),
            samples: Vec::new(),
            report: CollectionReport::default(),
        }
    }

    /// Label recorded as the baseline's `source_folder`
    pub fn with_source_folder(mut self, source_folder: impl Into<String>) -> Self {
        self.source_folder = source_folder.into();
        self
    }

    /// Add one detection record.
    ///
    /// Returns `true` if the record contributed a sample.
    pub fn add(&mut self, name: impl Into<String>, detection: &Detection) -> bool {
        let name = name.into();

        match extract_sample(detection) {
            Ok(sample) => {
                tracing::debug!(
                    record = %name,
                    joints = sample.landmarks.joint_count(),
                    angles = sample.angles.angle_count(),
                    "Processed reference record"
                );
                self.samples.push(sample);
                self.report.processed.push(name);
                true
            }
            Err(err) => {
                let reason = match err {
                    FormError::InvalidImageSize { width, height } => {
                        SkipReason::InvalidImageSize { width, height }
                    }
                    _ => SkipReason::NoPose,
                };
                tracing::warn!(record = %name, %reason, "Skipping reference record");
                self.report.skipped.push(SkippedRecord { name, reason });
                false
            }
        }
    }

    /// Aggregate the collected samples, stamping the current local time
    pub fn finish(self) -> FormResult<(Baseline, CollectionReport)> {
        self.finish_at(Local::now().naive_local())
    }

    /// Aggregate the collected samples with an explicit creation time.
    ///
    /// Fails with [`FormError::NoSamples`] when no record was usable.
    pub fn finish_at(self, created_at: NaiveDateTime) -> FormResult<(Baseline, CollectionReport)> {
        if self.samples.is_empty() {
            tracing::warn!(
                skipped = self.report.skipped.len(),
                "No valid pose data extracted from any record"
            );
            return Err(FormError::NoSamples);
        }

        let metadata = BaselineMetadata {
            created_at,
            source_folder: self.source_folder,
            num_images_processed: self.samples.len(),
            processed_files: self.report.processed.clone(),
            aggregate_method: self.aggregator.method(),
        };
        let baseline = self.aggregator.build(metadata, self.samples)?;

        tracing::info!(
            method = %baseline.method(),
            processed = self.report.processed.len(),
            skipped = self.report.skipped.len(),
            "Baseline collected"
        );

        Ok((baseline, self.report))
    }
}

/// Baseline from a single detection, stored with method `first`
pub fn single_sample_baseline(detection: &Detection) -> FormResult<Baseline> {
    let sample = extract_sample(detection)?;
    let metadata = BaselineMetadata {
        created_at: Local::now().naive_local(),
        source_folder: SINGLE_SAMPLE_SOURCE.to_string(),
        num_images_processed: 1,
        processed_files: Vec::new(),
        aggregate_method: AggregateMethod::First,
    };
    BaselineAggregator::new(AggregateMethod::First).build(metadata, vec![sample])
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::{Arm, ArmJoints, ImageSize, Joint, PixelJoint, PixelLandmarks};

    fn detection(shoulder_x: i32) -> Detection {
        let arm = ArmJoints::new()
            .with(Joint::Shoulder, PixelJoint::new(shoulder_x, 100, 0.9))
            .with(Joint::Elbow, PixelJoint::new(shoulder_x, 200, 0.9))
            .with(Joint::Wrist, PixelJoint::new(shoulder_x + 100, 200, 0.8));
        Detection::new(ImageSize::new(400, 400), PixelLandmarks::new(arm, ArmJoints::new()))
    }

    fn created_at() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_extract_sample_normalizes_and_computes_angles() {
        let sample = extract_sample(&detection(100)).unwrap();
        let shoulder = sample.landmarks.joint(Arm::LeftArm, Joint::Shoulder).unwrap();
        assert_eq!((shoulder.x, shoulder.y), (0.25, 0.25));

        let angles = sample.angles.get(Arm::LeftArm);
        assert!((angles.elbow_angle.unwrap() - 90.0).abs() < 0.01);
        assert!(angles.shoulder_angle.unwrap().abs() < 1e-9);
        assert!(sample.angles.right_arm.is_empty());
    }

    #[test]
    fn test_skips_unusable_records() {
        let mut collector = BaselineCollector::new(AggregateMethod::Average).with_source_folder("refs");

        assert!(collector.add("a.json", &detection(100)));
        assert!(!collector.add("b.json", &Detection::no_pose(ImageSize::new(400, 400))));
        let mut zero = detection(100);
        zero.image = ImageSize::new(0, 400);
        assert!(!collector.add("c.json", &zero));
        assert!(collector.add("d.json", &detection(120)));

        let (baseline, report) = collector.finish_at(created_at()).unwrap();
        assert_eq!(report.processed, vec!["a.json", "d.json"]);
        assert_eq!(report.skipped[0].reason, SkipReason::NoPose);
        assert_eq!(
            report.skipped[1].reason,
            SkipReason::InvalidImageSize { width: 0, height: 400 }
        );
        assert_eq!(report.total(), 4);

        assert_eq!(baseline.metadata.num_images_processed, 2);
        assert_eq!(baseline.metadata.processed_files, vec!["a.json", "d.json"]);
        assert_eq!(baseline.metadata.source_folder, "refs");
        assert_eq!(baseline.metadata.created_at, created_at());

        let (landmarks, _) = baseline.stats().unwrap();
        let shoulder = landmarks.joint(Arm::LeftArm, Joint::Shoulder).unwrap();
        assert!((shoulder.x - 0.275).abs() < 1e-12);
    }

    #[test]
    fn test_nothing_usable_fails() {
        let mut collector = BaselineCollector::new(AggregateMethod::Median);
        collector.add("a.json", &Detection::no_pose(ImageSize::new(640, 480)));
        let err = collector.finish().unwrap_err();
        assert!(matches!(err, FormError::NoSamples));
    }

    #[test]
    fn test_single_sample_baseline() {
        let baseline = single_sample_baseline(&detection(100)).unwrap();
        assert_eq!(baseline.method(), AggregateMethod::First);
        assert_eq!(baseline.metadata.num_images_processed, 1);
        assert_eq!(baseline.metadata.source_folder, SINGLE_SAMPLE_SOURCE);
        baseline.check_consistency().unwrap();
    }

    #[test]
    fn test_single_sample_without_pose_fails() {
        let err = single_sample_baseline(&Detection::no_pose(ImageSize::new(640, 480))).unwrap_err();
        assert!(matches!(err, FormError::NoPoseDetected));
    }
}
