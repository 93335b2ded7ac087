//! One nested subdomain in a multilevel splitting sequence.
//!
//! Two concrete variants share a narrow capability set: score a batch into
//! a log conditional probability, then draw one batch from the relaxed
//! domain with LIN-ESS.
//! - `HdrNesting` is built from a prescribed shift and scored later.
//! - `SubsetNesting` discovers its shift from a batch so that a target
//!   fraction of the samples falls inside; it is born scored.
//!
//! Each nesting walks Unscored → Scored → Sampled exactly once; out-of-order
//! use is an error rather than a silent re-score.

use nalgebra::{DMatrix, DVector};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::constraints::LinearConstraints;
use crate::error::Error;
use crate::sampling::EllipticalSliceSampler;

#[derive(Clone, Copy, Debug)]
enum Stage {
    Unscored,
    Scored { log_factor: f64 },
    Sampled { log_factor: f64 },
}

/// Nesting with a prescribed shift, for the Holmes-Diaconis-Ross estimator.
#[derive(Clone, Debug)]
pub struct HdrNesting {
    shifted: LinearConstraints,
    shift: f64,
    stage: Stage,
}

impl HdrNesting {
    pub fn new(lincon: &LinearConstraints, shift: f64) -> Self {
        Self {
            shifted: lincon.shifted(shift),
            shift,
            stage: Stage::Unscored,
        }
    }

    #[inline]
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Log conditional probability, once scored.
    pub fn log_factor(&self) -> Option<f64> {
        match self.stage {
            Stage::Unscored => None,
            Stage::Scored { log_factor } | Stage::Sampled { log_factor } => Some(log_factor),
        }
    }

    /// Per-column indicator of the relaxed domain.
    pub fn samples_inside(&self, x: &DMatrix<f64>) -> Vec<bool> {
        self.shifted.indicator(x)
    }

    /// Number of columns of `x` inside the relaxed domain.
    pub fn n_inside(&self, x: &DMatrix<f64>) -> usize {
        self.samples_inside(x).iter().filter(|&&inside| inside).count()
    }

    /// Score a batch drawn in the enclosing nesting: `log(Σ 1) − log N`.
    ///
    /// An empty count yields `-∞`, the signal that the shift sequence is not
    /// admissible for this batch size.
    pub fn score(&mut self, x: &DMatrix<f64>) -> Result<f64, Error> {
        if !matches!(self.stage, Stage::Unscored) {
            return Err(Error::StaleNesting { op: "scored" });
        }
        let log_factor = (self.n_inside(x) as f64).ln() - (x.ncols() as f64).ln();
        self.stage = Stage::Scored { log_factor };
        Ok(log_factor)
    }

    /// Draw `n_samples` states inside this nesting with LIN-ESS, starting
    /// from `x_init` (each column already inside the relaxed domain).
    pub fn sample<R: Rng>(
        &mut self,
        n_samples: usize,
        x_init: &DMatrix<f64>,
        n_skip: usize,
        rng: &mut R,
    ) -> Result<DMatrix<f64>, Error> {
        let log_factor = match self.stage {
            Stage::Scored { log_factor } => log_factor,
            _ => return Err(Error::StaleNesting { op: "sampled" }),
        };
        let mut sampler =
            EllipticalSliceSampler::new(n_samples, self.shifted.clone(), n_skip, x_init)?;
        sampler.run(rng)?;
        self.stage = Stage::Sampled { log_factor };
        let x = sampler.state().x();
        Ok(x.columns(x_init.ncols(), n_samples).into_owned())
    }
}

/// Nesting whose shift is discovered from a batch, for Subset Simulation.
///
/// Invariants:
/// - `shift >= 0`; successive nestings built from each other's batches have
///   non-increasing shifts, reaching exactly 0 at the target domain.
/// - The pivot sample sits on the boundary of the new domain and counts as
///   inside.
#[derive(Clone, Debug)]
pub struct SubsetNesting {
    shifted: LinearConstraints,
    shift: f64,
    log_factor: f64,
    x_in: DMatrix<f64>,
    inside: DMatrix<f64>,
    sampled: bool,
}

impl SubsetNesting {
    /// Choose the smallest shift that admits `⌊N · fraction⌋` of the batch,
    /// or 0 when more than that many columns already satisfy the unshifted
    /// constraints. `n_save` seed columns for the next chain are drawn
    /// uniformly from the admitted set.
    pub fn from_batch<R: Rng>(
        lincon: &LinearConstraints,
        x: &DMatrix<f64>,
        fraction: f64,
        n_save: usize,
        rng: &mut R,
    ) -> Result<Self, Error> {
        if x.nrows() != lincon.n_dim() {
            return Err(Error::shape("batch rows", lincon.n_dim(), x.nrows()));
        }
        let n = x.ncols();
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(Error::invalid("domain fraction must lie in (0, 1)"));
        }
        let n_target = (n as f64 * fraction) as usize;
        if n_target == 0 {
            return Err(Error::invalid(
                "batch size times domain fraction must be at least 1",
            ));
        }
        if n_save == 0 {
            return Err(Error::invalid("n_save must be at least 1"));
        }

        // Exceedance per column: the shift that would just admit it.
        let values = lincon.evaluate(x);
        let exceedance: Vec<f64> = (0..n).map(|j| -values.column(j).min()).collect();

        let n_true_inside = exceedance.iter().filter(|&&v| v < 0.0).count();
        let (shift, idx_inside) = if n_true_inside > n_target {
            // Enough columns are already in the target domain.
            (0.0, (0..n).filter(|&j| exceedance[j] < 0.0).collect::<Vec<_>>())
        } else {
            let mut order: Vec<usize> = (0..n).collect();
            order.select_nth_unstable_by(n_target, |&a, &b| {
                exceedance[a].total_cmp(&exceedance[b])
            });
            let shift = exceedance[order[n_target]];
            order.truncate(n_target);
            (shift, order)
        };
        let n_inside = idx_inside.len();
        if n_save > n_inside {
            return Err(Error::invalid(format!(
                "n_save {n_save} exceeds the {n_inside} admitted samples"
            )));
        }

        let log_factor = (n_inside as f64).ln() - (n as f64).ln();
        let seeds: Vec<DVector<f64>> = idx_inside
            .choose_multiple(rng, n_save)
            .map(|&j| x.column(j).clone_owned())
            .collect();
        let inside = DMatrix::from_fn(x.nrows(), n_inside, |r, c| x[(r, idx_inside[c])]);

        Ok(Self {
            shifted: lincon.shifted(shift),
            shift,
            log_factor,
            x_in: DMatrix::from_columns(&seeds),
            inside,
            sampled: false,
        })
    }

    #[inline]
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Log conditional probability of this nesting given the previous one.
    #[inline]
    pub fn log_factor(&self) -> f64 {
        self.log_factor
    }

    /// Seed columns inside the relaxed domain (D×n_save).
    #[inline]
    pub fn x_in(&self) -> &DMatrix<f64> {
        &self.x_in
    }

    /// Columns of the construction batch admitted into this nesting.
    #[inline]
    pub fn samples_inside(&self) -> &DMatrix<f64> {
        &self.inside
    }

    /// Draw `n_samples` states inside this nesting with LIN-ESS, seeded from
    /// the saved `x_in` columns.
    pub fn sample<R: Rng>(
        &mut self,
        n_samples: usize,
        n_skip: usize,
        rng: &mut R,
    ) -> Result<DMatrix<f64>, Error> {
        if self.sampled {
            return Err(Error::StaleNesting { op: "sampled" });
        }
        let mut sampler =
            EllipticalSliceSampler::new(n_samples, self.shifted.clone(), n_skip, &self.x_in)?;
        sampler.run(rng)?;
        self.sampled = true;
        let x = sampler.state().x();
        Ok(x.columns(self.x_in.ncols(), n_samples).into_owned())
    }
}
