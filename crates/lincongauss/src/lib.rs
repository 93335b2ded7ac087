//! Integrals of the standard Gaussian over linearly constrained domains.
//!
//! Given an M×D matrix `A` and an M-vector `b`, this crate treats
//! `{x : Ax + b >= 0}` (all rows, or any row in union mode) as the
//! integration domain and estimates `Pr[X in domain]` for `X ~ N(0, I)`,
//! together with approximate samples from the truncated Gaussian.
//!
//! The pieces, leaves first:
//! - [`constraints::LinearConstraints`] evaluates `Ax + b` and the domain
//!   indicator, and produces shifted (relaxed) views `b ↦ b + s`.
//! - [`sampling`] holds the exact elliptical slice sampler (LIN-ESS): every
//!   chain step solves a closed-form arc-intersection problem on an ellipse
//!   through the current state, so no proposal is ever rejected.
//! - [`splitting`] holds the two multilevel integrators. Subset Simulation
//!   discovers a decreasing shift sequence ending at 0; Holmes-Diaconis-Ross
//!   re-scores that sequence with a larger batch.
//!
//! The method follows Gessner, Kanjilal and Hennig, "Integrals over
//! Gaussians under linear domain constraints" (AISTATS 2020).
//!
//! All randomness flows through a caller-supplied [`rand::Rng`], so runs are
//! reproducible from a seed. The crate is single-threaded; independent
//! problems can be run in parallel by the caller.

pub mod constraints;
pub mod error;
pub mod randn;
pub mod sampling;
pub mod splitting;

mod cfg;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use constraints::{LinearConstraints, Mode};
pub use error::Error;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::constraints::{LinearConstraints, Mode};
    pub use crate::error::Error;
    pub use crate::sampling::{
        ActiveIntersections, AngleSampler, Ellipse, EllipticalSliceSampler, SamplerState,
    };
    pub use crate::splitting::{Hdr, Nesting, SubsetSimulation, Tracker};
}

#[cfg(test)]
mod tests;
