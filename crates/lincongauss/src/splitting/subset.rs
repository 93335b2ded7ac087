//! Subset Simulation: adaptive discovery of the nesting sequence.
//!
//! Purpose
//! - Reduce a small Gaussian probability to a product of ~`fraction`-sized
//!   conditional probabilities by discovering a decreasing shift sequence
//!   from the samples themselves, terminating at shift 0.
//! - The discovered shifts (and per-nesting seed points) are the usual input
//!   to the HDR estimator, which re-scores them with a larger batch.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::constraints::LinearConstraints;
use crate::error::Error;
use crate::randn;

use super::nesting::SubsetNesting;
use super::tracker::{Nesting, Tracker};

/// Driver that grows a `Tracker` of subset nestings until the target domain
/// is reached.
pub struct SubsetSimulation {
    lincon: LinearConstraints,
    n_samples: usize,
    domain_fraction: f64,
    n_skip: usize,
    tracker: Tracker,
    timing: bool,
    times: Vec<Duration>,
}

impl SubsetSimulation {
    pub fn new(
        lincon: LinearConstraints,
        n_samples: usize,
        domain_fraction: f64,
        n_skip: usize,
    ) -> Result<Self, Error> {
        if !(domain_fraction > 0.0 && domain_fraction < 1.0) {
            return Err(Error::invalid("domain fraction must lie in (0, 1)"));
        }
        if (n_samples as f64 * domain_fraction) as usize == 0 {
            return Err(Error::invalid(
                "n_samples times domain fraction must be at least 1",
            ));
        }
        Ok(Self {
            lincon,
            n_samples,
            domain_fraction,
            n_skip,
            tracker: Tracker::new(),
            timing: false,
            times: Vec::new(),
        })
    }

    /// Record wall-clock time per nesting iteration (diagnostic only).
    pub fn with_timing(mut self) -> Self {
        self.timing = true;
        self
    }

    #[inline]
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Per-iteration wall times, when timing was requested.
    #[inline]
    pub fn times(&self) -> &[Duration] {
        &self.times
    }

    /// Discover the shift sequence, one nesting per iteration.
    ///
    /// On success the tracker is complete: its shift sequence is
    /// non-increasing and ends at exactly 0, and the admitted columns of the
    /// innermost nesting are kept as in-domain samples.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> Result<(), Error> {
        if self.tracker.n_nestings() > 0 {
            return Err(Error::invalid("subset simulation has already run"));
        }

        let x0 = randn::standard_normal_matrix(self.lincon.n_dim(), self.n_samples, rng);
        let mut nest =
            SubsetNesting::from_batch(&self.lincon, &x0, self.domain_fraction, 1, rng)?;

        let mut level = 0usize;
        loop {
            tracing::debug!(level, shift = nest.shift(), "finished nesting");
            if nest.shift() == 0.0 {
                self.tracker.set_samples(nest.samples_inside().clone());
                self.tracker.push(Nesting::Subset(nest));
                return Ok(());
            }

            let started = self.timing.then(Instant::now);
            let x = nest.sample(self.n_samples, self.n_skip, rng)?;
            let next =
                SubsetNesting::from_batch(&self.lincon, &x, self.domain_fraction, 1, rng)?;
            if let Some(t) = started {
                self.times.push(t.elapsed());
            }

            self.tracker.push(Nesting::Subset(nest));
            nest = next;
            level += 1;
        }
    }
}
