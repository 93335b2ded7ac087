//! Exact sampling from a linearly constrained unit Gaussian.
//!
//! Purpose
//! - `Ellipse` + `ActiveIntersections` + `AngleSampler` solve one slice of
//!   the chain in closed form; `EllipticalSliceSampler` strings the slices
//!   into a rejection-free Markov chain (LIN-ESS).

pub mod angles;
pub mod ellipse;
pub mod intersections;
pub mod slice;

pub use angles::AngleSampler;
pub use ellipse::Ellipse;
pub use intersections::{ActiveArcs, ActiveIntersections, RotatedArcs};
pub use slice::{EllipticalSliceSampler, SamplerState};
