//! Comparison context - the long-lived owner of the baseline and thresholds
//!
//! Comparisons never hold a lock while scoring. Each one takes an `Arc` to
//! the current baseline and a copy of the thresholds, so a reload or a
//! threshold update landing mid-comparison is seen either entirely or not
//! at all.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use formcheck_baseline::{extract_sample, load_baseline, scoring_stats};
use formcheck_core::{
    AngleStats, Baseline, Detection, FormError, FormResult, LandmarkStats, ReferenceSample,
};
use parking_lot::RwLock;

use crate::{
    generate_feedback, AccuracyClassifier, ComparisonConfig, ComparisonResult, DetailedReport,
    DeviationScorer, ThresholdUpdate,
};

/// A baseline ready for scoring
#[derive(Debug, Clone)]
pub struct LoadedBaseline {
    baseline: Baseline,
    landmarks: LandmarkStats,
    angles: AngleStats,
    source: Option<PathBuf>,
}

impl LoadedBaseline {
    /// Prepare a baseline record, reducing retained samples if needed
    pub fn new(baseline: Baseline) -> FormResult<Self> {
        let (landmarks, angles) = scoring_stats(&baseline)?;
        Ok(LoadedBaseline {
            baseline,
            landmarks,
            angles,
            source: None,
        })
    }

    /// Read and prepare a baseline file
    pub fn from_file(path: impl AsRef<Path>) -> FormResult<Self> {
        let path = path.as_ref();
        let mut loaded = Self::new(load_baseline(path)?)?;
        loaded.source = Some(path.to_path_buf());
        Ok(loaded)
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn landmarks(&self) -> &LandmarkStats {
        &self.landmarks
    }

    pub fn angles(&self) -> &AngleStats {
        &self.angles
    }

    /// File the baseline was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Score a live sample against a baseline under fixed thresholds
pub fn evaluate(live: &ReferenceSample, baseline: &LoadedBaseline, config: ComparisonConfig) -> ComparisonResult {
    let deviations = DeviationScorer::new(config).score(live, baseline.landmarks(), baseline.angles());
    let verdict = AccuracyClassifier::new(config.accuracy_threshold).classify(&deviations);
    let feedback = generate_feedback(&deviations, &verdict);

    ComparisonResult {
        overall_accuracy: verdict.overall_accuracy,
        accuracy_level: verdict.level,
        is_accurate: verdict.is_accurate,
        joint_feedback: feedback.joints,
        angle_feedback: feedback.angles,
        summary_message: feedback.summary,
        detailed_report: DetailedReport::Scored {
            position_scores: deviations.position_scores(),
            angle_scores: deviations.angle_scores(),
            normalized_landmarks: live.landmarks.clone(),
            current_angles: live.angles.clone(),
        },
    }
}

/// Baseline lifecycle as seen by the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineState {
    Absent,
    Loaded,
    Reloaded,
}

/// Shared comparison state
#[derive(Debug)]
pub struct ComparisonContext {
    baseline: RwLock<Option<Arc<LoadedBaseline>>>,
    config: RwLock<ComparisonConfig>,
    loads: AtomicU64,
}

impl Default for ComparisonContext {
    fn default() -> Self {
        ComparisonContext {
            baseline: RwLock::new(None),
            config: RwLock::new(ComparisonConfig::default()),
            loads: AtomicU64::new(0),
        }
    }
}

impl ComparisonContext {
    /// Create a context with no baseline
    pub fn new(config: ComparisonConfig) -> FormResult<Self> {
        Ok(ComparisonContext {
            config: RwLock::new(config.validate()?),
            ..Default::default()
        })
    }

    /// Load a baseline file and make it current.
    ///
    /// On failure the previous baseline stays in place.
    pub fn load_baseline(&self, path: impl AsRef<Path>) -> FormResult<Arc<LoadedBaseline>> {
        let loaded = LoadedBaseline::from_file(path)?;
        Ok(self.install(loaded))
    }

    /// Make an in-memory baseline current
    pub fn set_baseline(&self, baseline: Baseline) -> FormResult<Arc<LoadedBaseline>> {
        let loaded = LoadedBaseline::new(baseline)?;
        Ok(self.install(loaded))
    }

    fn install(&self, loaded: LoadedBaseline) -> Arc<LoadedBaseline> {
        let loaded = Arc::new(loaded);
        *self.baseline.write() = Some(Arc::clone(&loaded));
        let loads = self.loads.fetch_add(1, Ordering::AcqRel) + 1;

        tracing::info!(
            method = %loaded.baseline().method(),
            samples = loaded.baseline().metadata.num_images_processed,
            source = ?loaded.source(),
            loads,
            "Baseline installed"
        );
        loaded
    }

    /// Current baseline
    pub fn baseline(&self) -> FormResult<Arc<LoadedBaseline>> {
        self.baseline.read().clone().ok_or(FormError::BaselineNotLoaded)
    }

    pub fn state(&self) -> BaselineState {
        match self.loads.load(Ordering::Acquire) {
            0 => BaselineState::Absent,
            1 => BaselineState::Loaded,
            _ => BaselineState::Reloaded,
        }
    }

    /// Snapshot of the current thresholds
    pub fn config(&self) -> ComparisonConfig {
        *self.config.read()
    }

    /// Replace every threshold
    pub fn set_config(&self, config: ComparisonConfig) -> FormResult<()> {
        let config = config.validate()?;
        *self.config.write() = config;
        tracing::info!(?config, "Thresholds replaced");
        Ok(())
    }

    /// Apply a partial update; nothing changes if the result is invalid
    pub fn update_thresholds(&self, update: &ThresholdUpdate) -> FormResult<ComparisonConfig> {
        let mut current = self.config.write();
        let config = update.apply(*current)?;
        *current = config;
        drop(current);

        tracing::info!(?config, "Thresholds updated");
        Ok(config)
    }

    /// Compare a detection against the current baseline.
    ///
    /// A detection with no pose yields an `invalid` result, not an error.
    pub fn compare(&self, detection: &Detection) -> FormResult<ComparisonResult> {
        let baseline = self.baseline()?;

        if detection.pose().is_none() {
            tracing::debug!("No pose in detection, skipping scoring");
            return Ok(ComparisonResult::invalid());
        }

        let live = extract_sample(detection)?;
        Ok(evaluate(&live, &baseline, self.config()))
    }
}
