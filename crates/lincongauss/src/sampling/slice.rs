//! Elliptical slice sampling under linear constraints (LIN-ESS).
//!
//! Purpose
//! - Markov chain on the unit Gaussian restricted to the integration domain.
//!   Each step spans an ellipse through the current state and a fresh
//!   `N(0, I)` draw, finds the in-domain arcs exactly, and picks the next
//!   state uniformly from them. No step is ever rejected, so the chain moves
//!   on every iteration.
//!
//! Failure modes
//! - A proposal whose ellipse lies entirely outside the domain means the
//!   chain was started outside; that is a precondition violation, not a
//!   retryable event.
//! - Floating-point noise can place an arc endpoint draw marginally outside
//!   the closed domain; such candidates are discarded and the step is
//!   re-proposed a bounded number of times.

use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::cfg;
use crate::constraints::LinearConstraints;
use crate::error::Error;
use crate::randn;

use super::angles::AngleSampler;
use super::ellipse::Ellipse;
use super::intersections::ActiveIntersections;

/// Chain history: the initial columns followed by every recorded state.
#[derive(Clone, Debug)]
pub struct SamplerState {
    samples: Vec<DVector<f64>>,
    iteration: usize,
}

impl SamplerState {
    fn new(x_init: &DMatrix<f64>) -> Self {
        Self {
            samples: x_init.column_iter().map(|c| c.clone_owned()).collect(),
            iteration: 0,
        }
    }

    fn update(&mut self, x: DVector<f64>) {
        self.iteration += 1;
        self.samples.push(x);
    }

    /// Number of recorded (post-initial) states.
    #[inline]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Current chain state.
    #[inline]
    pub fn last(&self) -> &DVector<f64> {
        &self.samples[self.samples.len() - 1]
    }

    /// All states as a D×(K + iterations) matrix, one column per state.
    pub fn x(&self) -> DMatrix<f64> {
        DMatrix::from_columns(&self.samples)
    }
}

/// LIN-ESS chain over a linearly constrained unit Gaussian.
pub struct EllipticalSliceSampler {
    n_iterations: usize,
    lincon: LinearConstraints,
    n_skip: usize,
    state: SamplerState,
}

impl EllipticalSliceSampler {
    /// `x_init` is D×K with K ≥ 1; every column must lie in the domain.
    /// Between two recorded states the chain advances `n_skip + 1` times.
    pub fn new(
        n_iterations: usize,
        lincon: LinearConstraints,
        n_skip: usize,
        x_init: &DMatrix<f64>,
    ) -> Result<Self, Error> {
        if x_init.nrows() != lincon.n_dim() {
            return Err(Error::shape("x_init rows", lincon.n_dim(), x_init.nrows()));
        }
        if x_init.ncols() == 0 {
            return Err(Error::invalid("x_init needs at least one column"));
        }
        for col in x_init.column_iter() {
            if !lincon.contains(&col.clone_owned()) {
                return Err(Error::NotInDomain { what: "x_init" });
            }
        }
        Ok(Self {
            n_iterations,
            lincon,
            n_skip,
            state: SamplerState::new(x_init),
        })
    }

    /// Draw standard-normal vectors until one lies in the domain.
    ///
    /// Useful when no starting point is known; attempts are bounded because
    /// small domains make rejection sampling hopeless.
    pub fn find_starting_point<R: Rng>(
        lincon: &LinearConstraints,
        rng: &mut R,
    ) -> Result<DVector<f64>, Error> {
        for _ in 0..cfg::MAX_INIT_SEARCH {
            let x = randn::standard_normal_vector(lincon.n_dim(), rng);
            if lincon.contains(&x) {
                return Ok(x);
            }
        }
        Err(Error::NoStartingPoint {
            attempts: cfg::MAX_INIT_SEARCH,
        })
    }

    #[inline]
    pub fn state(&self) -> &SamplerState {
        &self.state
    }

    #[inline]
    pub fn constraints(&self) -> &LinearConstraints {
        &self.lincon
    }

    /// Advance the chain until `n_iterations` states are recorded.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> Result<(), Error> {
        while !self.is_converged() {
            let mut x = self.state.last().clone();
            for _ in 0..=self.n_skip {
                x = self.next_point(&x, rng)?;
            }
            self.state.update(x);
        }
        Ok(())
    }

    #[inline]
    fn is_converged(&self) -> bool {
        self.state.iteration() >= self.n_iterations
    }

    /// One accepted chain move from `x0`, re-proposing on numerical misses.
    fn next_point<R: Rng>(&self, x0: &DVector<f64>, rng: &mut R) -> Result<DVector<f64>, Error> {
        let mut retries = 0;
        loop {
            match self.propose(x0, rng) {
                Ok(x1) if self.lincon.contains(&x1) => return Ok(x1),
                Ok(_) => {
                    tracing::warn!("candidate outside domain, resampling");
                }
                Err(Error::DegenerateIntersections { reductions }) => {
                    tracing::warn!(reductions, "near-tangential ellipse, resampling");
                }
                Err(e) => return Err(e),
            }
            retries += 1;
            if retries >= cfg::MAX_RESAMPLE {
                return Err(Error::ResampleOverflow { retries });
            }
        }
    }

    /// Propose a candidate on a fresh ellipse through `x0`.
    fn propose<R: Rng>(&self, x0: &DVector<f64>, rng: &mut R) -> Result<DVector<f64>, Error> {
        let nu = randn::standard_normal_vector(self.lincon.n_dim(), rng);
        let ellipse = Ellipse::new(x0.clone(), nu)?;
        let arcs = ActiveIntersections::new(&ellipse, &self.lincon).rotated_intersections(rng)?;
        if !arcs.ellipse_in_domain {
            // The current state is not in the domain; the chain was
            // misinitialised.
            return Err(Error::NotInDomain {
                what: "chain state",
            });
        }
        let theta = AngleSampler::new(&arcs)?.draw_angle(rng);
        Ok(ellipse.x(theta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Mode;
    use nalgebra::{dmatrix, dvector};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn box_domain() -> LinearConstraints {
        // |x| <= 1, |y| <= 1.
        LinearConstraints::new(
            dmatrix![1.0, 0.0; -1.0, 0.0; 0.0, 1.0; 0.0, -1.0],
            dvector![1.0, 1.0, 1.0, 1.0],
            Mode::Intersection,
        )
        .unwrap()
    }

    #[test]
    fn every_recorded_state_is_in_domain() {
        let lincon = box_domain();
        let x_init = DMatrix::from_column_slice(2, 1, &[0.0, 0.0]);
        let mut sampler = EllipticalSliceSampler::new(200, lincon.clone(), 0, &x_init).unwrap();
        sampler.run(&mut StdRng::seed_from_u64(0)).unwrap();

        let x = sampler.state().x();
        assert_eq!(x.ncols(), 201);
        assert!(lincon.indicator(&x).iter().all(|&inside| inside));
    }

    #[test]
    fn skip_does_not_change_recorded_count() {
        let lincon = box_domain();
        let x_init = DMatrix::from_column_slice(2, 1, &[0.1, -0.2]);
        let mut sampler = EllipticalSliceSampler::new(10, lincon, 3, &x_init).unwrap();
        sampler.run(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(sampler.state().iteration(), 10);
        assert_eq!(sampler.state().x().ncols(), 11);
    }

    #[test]
    fn out_of_domain_start_is_rejected() {
        let lincon = box_domain();
        let x_init = DMatrix::from_column_slice(2, 1, &[2.0, 0.0]);
        assert!(matches!(
            EllipticalSliceSampler::new(10, lincon, 0, &x_init),
            Err(Error::NotInDomain { .. })
        ));
    }

    #[test]
    fn runs_are_reproducible_from_the_seed() {
        let lincon = box_domain();
        let x_init = DMatrix::from_column_slice(2, 1, &[0.0, 0.0]);
        let mut a = EllipticalSliceSampler::new(50, lincon.clone(), 1, &x_init).unwrap();
        let mut b = EllipticalSliceSampler::new(50, lincon, 1, &x_init).unwrap();
        a.run(&mut StdRng::seed_from_u64(42)).unwrap();
        b.run(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.state().x(), b.state().x());
    }

    #[test]
    fn starting_point_search_lands_inside() {
        let lincon = box_domain();
        let x = EllipticalSliceSampler::find_starting_point(&lincon, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert!(lincon.contains(&x));
    }
}
