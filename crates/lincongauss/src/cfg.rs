//! Numerical tolerances and retry bounds (internal).
//!
//! Policy
//! - Defaults are fixed constants to avoid tolerance juggling during normal
//!   development. Adjustments are rare; if needed later we can make these
//!   configurable behind a small `Config` without changing call sites broadly.

/// Initial probe angle for the crossing-direction test on an ellipse.
pub(crate) const DELTA_THETA_INIT: f64 = 1e-10 * std::f64::consts::TAU;
/// Shrink factor applied to the probe angle when the crossing count is odd.
pub(crate) const DELTA_THETA_SHRINK: f64 = 0.1;
/// Maximum number of probe-angle reductions before a tangency is declared
/// unresolvable.
pub(crate) const MAX_TANGENCY_REDUCTIONS: usize = 8;
/// Maximum number of fresh ellipse proposals per chain step when a candidate
/// lands outside the domain due to floating-point noise.
pub(crate) const MAX_RESAMPLE: usize = 100;
/// Maximum number of standard-normal draws when searching for an in-domain
/// starting point.
pub(crate) const MAX_INIT_SEARCH: usize = 10_000;
