//! Holmes-Diaconis-Ross estimation over a prescribed shift sequence.
//!
//! Each level is scored before anything is drawn from it: the batch from the
//! enclosing level is scored under the current shift, and only then is the
//! next batch sampled inside the current level. The final (shift 0) level is
//! scored but never sampled from; the columns of its scoring batch that
//! satisfy the unshifted constraints become the output samples.

use std::time::{Duration, Instant};

use nalgebra::DMatrix;
use rand::Rng;

use crate::constraints::LinearConstraints;
use crate::error::Error;
use crate::randn;

use super::nesting::HdrNesting;
use super::tracker::{Nesting, Tracker};

/// Driver that re-scores a discovered shift sequence with a larger batch.
pub struct Hdr {
    lincon: LinearConstraints,
    shifts: Vec<f64>,
    n_samples: usize,
    x_init: DMatrix<f64>,
    n_skip: usize,
    tracker: Tracker,
    timing: bool,
    times: Vec<Duration>,
}

impl Hdr {
    /// `shifts` must be non-increasing and nonnegative (typically ending at
    /// 0); column `i` of `x_init` must lie in the `i`-th relaxed domain.
    pub fn new(
        lincon: LinearConstraints,
        shifts: Vec<f64>,
        n_samples: usize,
        x_init: DMatrix<f64>,
        n_skip: usize,
    ) -> Result<Self, Error> {
        if shifts.is_empty() {
            return Err(Error::invalid("shift sequence must be nonempty"));
        }
        if shifts.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(Error::invalid("shifts must be finite and nonnegative"));
        }
        if shifts.windows(2).any(|w| w[1] > w[0]) {
            return Err(Error::invalid("shift sequence must be non-increasing"));
        }
        if n_samples == 0 {
            return Err(Error::invalid("n_samples must be at least 1"));
        }
        if x_init.nrows() != lincon.n_dim() {
            return Err(Error::shape("x_init rows", lincon.n_dim(), x_init.nrows()));
        }
        if x_init.ncols() != shifts.len() {
            return Err(Error::shape("x_init columns", shifts.len(), x_init.ncols()));
        }
        Ok(Self {
            lincon,
            shifts,
            n_samples,
            x_init,
            n_skip,
            tracker: Tracker::new(),
            timing: false,
            times: Vec::new(),
        })
    }

    /// Record wall-clock time per level (diagnostic only).
    pub fn with_timing(mut self) -> Self {
        self.timing = true;
        self
    }

    #[inline]
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Per-level wall times, when timing was requested.
    #[inline]
    pub fn times(&self) -> &[Duration] {
        &self.times
    }

    /// Score every level and collect the final in-domain samples.
    ///
    /// A level that admits none of its scoring batch collapses the product
    /// to zero; the run fails with `Error::EmptyNesting` after recording the
    /// `-∞` level in the tracker.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> Result<(), Error> {
        if self.tracker.n_nestings() > 0 {
            return Err(Error::invalid("hdr estimator has already run"));
        }

        let shifts = self.shifts.clone();
        let last = shifts.len() - 1;
        let mut x = randn::standard_normal_matrix(self.lincon.n_dim(), self.n_samples, rng);

        for (i, &shift) in shifts.iter().enumerate() {
            let started = self.timing.then(Instant::now);
            let mut nest = HdrNesting::new(&self.lincon, shift);
            let log_factor = nest.score(&x)?;
            if log_factor == f64::NEG_INFINITY {
                self.tracker.push(Nesting::Hdr(nest));
                return Err(Error::EmptyNesting { level: i });
            }
            if i < last {
                let seed = DMatrix::from_columns(&[self.x_init.column(i).clone_owned()]);
                x = nest.sample(self.n_samples, &seed, self.n_skip, rng)?;
            }
            self.tracker.push(Nesting::Hdr(nest));
            if let Some(t) = started {
                self.times.push(t.elapsed());
            }
            tracing::debug!(level = i, shift, "finished nesting");
        }

        let inside = self.lincon.indicator(&x);
        let kept: Vec<_> = x
            .column_iter()
            .zip(inside)
            .filter_map(|(col, keep)| keep.then(|| col.clone_owned()))
            .collect();
        if !kept.is_empty() {
            self.tracker.set_samples(DMatrix::from_columns(&kept));
        }
        Ok(())
    }
}
