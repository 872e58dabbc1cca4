//! formcheck Core - Pose landmark types and geometry
//!
//! This crate defines the types shared by every formcheck crate:
//! - Arm and joint identifiers (Arm, Joint, AngleKind)
//! - Per-arm landmark containers with explicit joint presence
//! - Pixel to unit-square normalization
//! - Elbow and shoulder angle calculation
//! - The persisted baseline record
//! - The workspace error type

pub mod landmark;
pub mod normalize;
pub mod angles;
pub mod baseline;
pub mod error;

pub use landmark::*;
pub use normalize::*;
pub use angles::*;
pub use baseline::*;
pub use error::*;
