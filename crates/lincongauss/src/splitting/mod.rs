//! Multilevel splitting integrators.
//!
//! Purpose
//! - Turn a small Gaussian probability into a product of conditional
//!   probabilities over nested, progressively tighter domains. Subset
//!   Simulation discovers the nesting sequence adaptively; HDR re-estimates
//!   a given sequence with a larger batch.

pub mod hdr;
pub mod nesting;
pub mod subset;
pub mod tracker;

pub use hdr::Hdr;
pub use nesting::{HdrNesting, SubsetNesting};
pub use subset::SubsetSimulation;
pub use tracker::{Nesting, Tracker};
