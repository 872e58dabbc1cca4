//! Collect-then-compare scenarios
//!
//! A scenario builds a baseline from synthetic reference detections, then
//! scores a second stream of live detections against it.

use formcheck_baseline::{BaselineCollector, CollectionReport};
use formcheck_compare::{AccuracyLevel, ComparisonConfig, ComparisonContext, ComparisonResult};
use formcheck_core::{AggregateMethod, Baseline, FormResult};

use crate::{PoseSynthesizer, SynthConfig};

/// Scenario parameters
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub references: usize,
    pub live_samples: usize,
    pub method: AggregateMethod,
    pub comparison: ComparisonConfig,
    /// Offset applied to the live template, in pixels
    pub live_shift: (i32, i32),
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            references: 10,
            live_samples: 20,
            method: AggregateMethod::Average,
            comparison: ComparisonConfig::default(),
            live_shift: (0, 0),
        }
    }
}

pub struct ScenarioOutcome {
    pub baseline: Baseline,
    pub report: CollectionReport,
    pub results: Vec<ComparisonResult>,
}

impl ScenarioOutcome {
    /// Results that were actually scored
    pub fn scored(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results
            .iter()
            .filter(|r| r.accuracy_level != AccuracyLevel::Invalid)
    }

    /// Mean accuracy over scored results
    pub fn mean_accuracy(&self) -> f64 {
        let (sum, count) = self
            .scored()
            .fold((0.0, 0usize), |(sum, count), r| (sum + r.overall_accuracy, count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Fraction of scored results judged accurate
    pub fn pass_rate(&self) -> f64 {
        let scored = self.scored().count();
        if scored == 0 {
            return 0.0;
        }
        self.scored().filter(|r| r.is_accurate).count() as f64 / scored as f64
    }

    pub fn invalid_count(&self) -> usize {
        self.results.len() - self.scored().count()
    }
}

/// Run a scenario; references use `seed`, live samples `seed + 1`
pub fn run_scenario(config: &ScenarioConfig, synth: SynthConfig, seed: u64) -> FormResult<ScenarioOutcome> {
    let mut references = PoseSynthesizer::new(synth.clone(), seed);
    let mut collector = BaselineCollector::new(config.method).with_source_folder("synthetic");
    for (i, detection) in references.batch(config.references).iter().enumerate() {
        collector.add(format!("ref_{i:03}.json"), detection);
    }
    let (baseline, report) = collector.finish()?;

    let context = ComparisonContext::new(config.comparison)?;
    context.set_baseline(baseline.clone())?;

    let mut live = PoseSynthesizer::new(synth, seed.wrapping_add(1));
    live.shift(config.live_shift.0, config.live_shift.1);
    let results = live
        .batch(config.live_samples)
        .iter()
        .map(|detection| context.compare(detection))
        .collect::<FormResult<Vec<_>>>()?;

    Ok(ScenarioOutcome {
        baseline,
        report,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_pose_passes() {
        let outcome = run_scenario(&ScenarioConfig::default(), SynthConfig::default(), 11).unwrap();
        assert_eq!(outcome.report.processed.len(), 10);
        assert!(outcome.mean_accuracy() > 75.0);
        assert_eq!(outcome.pass_rate(), 1.0);
    }

    #[test]
    fn test_shifted_pose_fails() {
        let config = ScenarioConfig {
            live_shift: (120, 90),
            ..ScenarioConfig::default()
        };
        let outcome = run_scenario(&config, SynthConfig::default(), 11).unwrap();
        assert_eq!(outcome.pass_rate(), 0.0);
        assert!(outcome
            .results
            .iter()
            .all(|r| r.summary_message.starts_with("Accuracy: ")));
    }

    #[test]
    fn test_noisy_frames_are_invalid_not_errors() {
        let config = ScenarioConfig {
            references: 30,
            live_samples: 50,
            ..ScenarioConfig::default()
        };
        let outcome = run_scenario(&config, SynthConfig::noisy(), 5).unwrap();
        assert_eq!(outcome.report.total(), 30);
        assert_eq!(outcome.invalid_count() + outcome.scored().count(), 50);
    }
}
