//! Append-only record of a multilevel splitting run.

use nalgebra::{DMatrix, DVector};

use super::nesting::{HdrNesting, SubsetNesting};

/// Either concrete nesting variant, unified for bookkeeping.
#[derive(Clone, Debug)]
pub enum Nesting {
    Hdr(HdrNesting),
    Subset(SubsetNesting),
}

impl Nesting {
    #[inline]
    pub fn shift(&self) -> f64 {
        match self {
            Nesting::Hdr(n) => n.shift(),
            Nesting::Subset(n) => n.shift(),
        }
    }

    /// Log conditional probability, if the nesting has been scored.
    #[inline]
    pub fn log_factor(&self) -> Option<f64> {
        match self {
            Nesting::Hdr(n) => n.log_factor(),
            Nesting::Subset(n) => Some(n.log_factor()),
        }
    }

    /// Saved in-domain seed columns (Subset nestings only).
    #[inline]
    pub fn x_in(&self) -> Option<&DMatrix<f64>> {
        match self {
            Nesting::Hdr(_) => None,
            Nesting::Subset(n) => Some(n.x_in()),
        }
    }
}

/// Ordered sequence of nestings plus the final in-domain samples.
///
/// Invariants:
/// - Append-only; the shift sequence is monotone non-increasing.
/// - Complete iff the innermost nesting has shift exactly 0.
#[derive(Clone, Debug, Default)]
pub struct Tracker {
    nestings: Vec<Nesting>,
    samples: Option<DMatrix<f64>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, nesting: Nesting) {
        debug_assert!(
            self.nestings
                .last()
                .is_none_or(|prev| nesting.shift() <= prev.shift()),
            "shift sequence must be non-increasing"
        );
        self.nestings.push(nesting);
    }

    #[inline]
    pub fn nestings(&self) -> &[Nesting] {
        &self.nestings
    }

    #[inline]
    pub fn n_nestings(&self) -> usize {
        self.nestings.len()
    }

    /// Whether the sequence has reached the target domain (shift 0).
    pub fn is_complete(&self) -> bool {
        self.nestings
            .last()
            .is_some_and(|nest| nest.shift() == 0.0)
    }

    /// Per-level log conditional probabilities, in nesting order.
    pub fn log_factors(&self) -> Vec<f64> {
        self.nestings
            .iter()
            .filter_map(Nesting::log_factor)
            .collect()
    }

    /// Per-level conditional probabilities `p̂ ∈ (0, 1]`.
    pub fn nesting_factors(&self) -> Vec<f64> {
        self.log_factors().iter().map(|lf| lf.exp()).collect()
    }

    /// Log of the estimated integral: `Σ log p̂`.
    pub fn log_integral(&self) -> f64 {
        self.log_factors().iter().sum()
    }

    /// Base-2 log of the estimated integral.
    pub fn log2_integral(&self) -> f64 {
        self.log_integral() / std::f64::consts::LN_2
    }

    /// Estimated integral `Π p̂`, accumulated in log space.
    pub fn integral(&self) -> f64 {
        self.log_integral().exp()
    }

    /// All shifts in nesting order.
    pub fn shift_sequence(&self) -> Vec<f64> {
        self.nestings.iter().map(Nesting::shift).collect()
    }

    /// Saved seed columns of all nestings, stacked horizontally.
    ///
    /// `None` when no nesting carries seeds (pure HDR runs).
    pub fn x_inits(&self) -> Option<DMatrix<f64>> {
        let cols: Vec<DVector<f64>> = self
            .nestings
            .iter()
            .filter_map(Nesting::x_in)
            .flat_map(|m| m.column_iter().map(|c| c.clone_owned()))
            .collect();
        if cols.is_empty() {
            None
        } else {
            Some(DMatrix::from_columns(&cols))
        }
    }

    /// Final samples inside the target domain, when the run kept them.
    #[inline]
    pub fn samples(&self) -> Option<&DMatrix<f64>> {
        self.samples.as_ref()
    }

    pub(crate) fn set_samples(&mut self, samples: DMatrix<f64>) {
        self.samples = Some(samples);
    }
}
