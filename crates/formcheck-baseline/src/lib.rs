//! formcheck Baseline - Reference pose aggregation
//!
//! This crate implements the collection side of formcheck:
//! - Summary statistics over the samples where a field is present
//! - Aggregation of reference samples (average, median, first, all)
//! - Batch collection from detection records, tolerating per-sample failures
//! - Single-sample baselines
//! - Baseline file load and save

pub mod stats;
pub mod aggregate;
pub mod collector;
pub mod store;

pub use stats::*;
pub use aggregate::*;
pub use collector::*;
pub use store::*;
