//! Seeded standard-normal draws for chains and integrator batches.
//!
//! All randomness in this crate flows through an injected `Rng` so that runs
//! are reproducible from a seed. Draw order is fixed: matrices fill column by
//! column.

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;

/// Draw a `dim`-vector with i.i.d. `N(0, 1)` entries.
pub fn standard_normal_vector<R: Rng>(dim: usize, rng: &mut R) -> DVector<f64> {
    let mut v = DVector::zeros(dim);
    for i in 0..dim {
        v[i] = rng.sample(StandardNormal);
    }
    v
}

/// Draw a `dim`×`n` matrix with i.i.d. `N(0, 1)` entries, column by column.
pub fn standard_normal_matrix<R: Rng>(dim: usize, n: usize, rng: &mut R) -> DMatrix<f64> {
    let mut m = DMatrix::zeros(dim, n);
    for j in 0..n {
        for i in 0..dim {
            m[(i, j)] = rng.sample(StandardNormal);
        }
    }
    m
}
