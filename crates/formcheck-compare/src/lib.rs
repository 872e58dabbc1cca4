//! formcheck Compare - Scoring a live pose against a baseline
//!
//! This crate implements the comparison side of formcheck:
//! - Threshold configuration with runtime updates
//! - Deviation scoring with variance-aware thresholds
//! - Accuracy pooling and severity levels
//! - Directional correction messages
//! - A shared comparison context with copy-on-write baseline reloads

pub mod config;
pub mod scorer;
pub mod classifier;
pub mod feedback;
pub mod result;
pub mod context;

pub use config::*;
pub use scorer::*;
pub use classifier::*;
pub use feedback::*;
pub use result::*;
pub use context::*;
