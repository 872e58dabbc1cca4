//! formcheck Test Harness - Synthetic poses and end-to-end scenarios
//!
//! This crate provides:
//! - Seeded synthetic detections with pixel jitter and joint dropout
//! - Collect-then-compare scenarios over synthetic references

pub mod synth;
pub mod scenario;

pub use synth::*;
pub use scenario::*;
