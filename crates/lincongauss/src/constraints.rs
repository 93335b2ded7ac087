//! Linear constraint systems defining the integration domain.
//!
//! Purpose
//! - Hold the affine functions `f(x) = A x + b` and decide membership of the
//!   closed region where they are nonnegative, either jointly (intersection)
//!   or for at least one row (union).
//! - Provide the shifted view `b ↦ b + s` used by the multilevel splitting
//!   integrators to relax the domain.

use nalgebra::{DMatrix, DVector, DVectorView};

use crate::error::Error;

/// How the M half-space conditions combine into one domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// All rows of `Ax + b` must be nonnegative.
    Intersection,
    /// At least one row of `Ax + b` must be nonnegative.
    Union,
}

/// M affine functions `f(x) = A x + b` over `R^D`.
///
/// Invariants:
/// - `A` is M×D, `b` has length M; both immutable after construction.
/// - Membership uses `>= 0`; the boundary counts as inside.
#[derive(Clone, Debug)]
pub struct LinearConstraints {
    a: DMatrix<f64>,
    b: DVector<f64>,
    mode: Mode,
}

impl LinearConstraints {
    pub fn new(a: DMatrix<f64>, b: DVector<f64>, mode: Mode) -> Result<Self, Error> {
        if a.nrows() != b.len() {
            return Err(Error::shape("offset b", a.nrows(), b.len()));
        }
        if a.nrows() == 0 || a.ncols() == 0 {
            return Err(Error::invalid("constraint matrix A must be nonempty"));
        }
        Ok(Self { a, b, mode })
    }

    /// Number of constraints M.
    #[inline]
    pub fn n_constraints(&self) -> usize {
        self.a.nrows()
    }

    /// Ambient dimension D.
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.a.ncols()
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.a
    }

    #[inline]
    pub fn offset(&self) -> &DVector<f64> {
        &self.b
    }

    /// Evaluate all M functions at the N column locations of `x` (D×N).
    pub fn evaluate(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        assert_eq!(x.nrows(), self.n_dim(), "locations must be D x N");
        let mut out = &self.a * x;
        for mut col in out.column_iter_mut() {
            col += &self.b;
        }
        out
    }

    /// Evaluate all M functions at a single location.
    pub fn evaluate_point(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.n_dim(), "location must have length D");
        &self.a * x + &self.b
    }

    /// Whether a single point lies in the integration domain of `self.mode`.
    pub fn contains(&self, x: &DVector<f64>) -> bool {
        assert_eq!(x.len(), self.n_dim(), "location must have length D");
        self.satisfied(x.column(0))
    }

    /// Domain indicator per column of `x` (D×N), dispatching on `self.mode`.
    pub fn indicator(&self, x: &DMatrix<f64>) -> Vec<bool> {
        assert_eq!(x.nrows(), self.n_dim(), "locations must be D x N");
        x.column_iter().map(|c| self.satisfied(c)).collect()
    }

    /// Indicator of the intersection domain (all rows `>= 0`), regardless of mode.
    pub fn indicator_intersection(&self, x: &DMatrix<f64>) -> Vec<bool> {
        assert_eq!(x.nrows(), self.n_dim(), "locations must be D x N");
        x.column_iter()
            .map(|c| (0..self.n_constraints()).all(|i| self.row_at(i, c) >= 0.0))
            .collect()
    }

    /// Indicator of the union domain (any row `>= 0`), regardless of mode.
    pub fn indicator_union(&self, x: &DMatrix<f64>) -> Vec<bool> {
        assert_eq!(x.nrows(), self.n_dim(), "locations must be D x N");
        x.column_iter()
            .map(|c| (0..self.n_constraints()).any(|i| self.row_at(i, c) >= 0.0))
            .collect()
    }

    /// Same constraints with the offset relaxed to `b + s` (elementwise).
    pub fn shifted(&self, shift: f64) -> Self {
        debug_assert!(shift >= 0.0, "shift must be nonnegative");
        Self {
            a: self.a.clone(),
            b: self.b.add_scalar(shift),
            mode: self.mode,
        }
    }

    fn satisfied(&self, x: DVectorView<'_, f64>) -> bool {
        let m = self.n_constraints();
        match self.mode {
            Mode::Intersection => (0..m).all(|i| self.row_at(i, x) >= 0.0),
            Mode::Union => (0..m).any(|i| self.row_at(i, x) >= 0.0),
        }
    }

    #[inline]
    fn row_at(&self, i: usize, x: DVectorView<'_, f64>) -> f64 {
        let mut acc = self.b[i];
        for k in 0..self.a.ncols() {
            acc += self.a[(i, k)] * x[k];
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randn;
    use nalgebra::{dmatrix, dvector};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn rejects_mismatched_offset() {
        let a = DMatrix::<f64>::identity(3, 3);
        let b = DVector::<f64>::zeros(2);
        assert!(matches!(
            LinearConstraints::new(a, b, Mode::Intersection),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn boundary_counts_as_inside() {
        let lincon = LinearConstraints::new(
            dmatrix![1.0, 0.0; 0.0, 1.0],
            dvector![0.0, 0.0],
            Mode::Intersection,
        )
        .unwrap();
        assert!(lincon.contains(&dvector![0.0, 0.0]));
        assert!(lincon.contains(&dvector![0.0, 1.0]));
        assert!(!lincon.contains(&dvector![-1e-12, 1.0]));
    }

    #[test]
    fn intersection_is_complement_of_union() {
        // With M = D and b = 0 the two indicators are pointwise opposite for
        // generic locations.
        let d = 15;
        let mut rng = StdRng::seed_from_u64(3);
        let a = randn::standard_normal_matrix(d, d, &mut rng);
        let b = DVector::zeros(d);
        let lincon = LinearConstraints::new(a, b, Mode::Intersection).unwrap();

        let x = randn::standard_normal_matrix(d, 100, &mut rng);
        let inter = lincon.indicator_intersection(&x);
        let union = lincon.indicator_union(&x);
        for (i, u) in inter.iter().zip(union.iter()) {
            assert_eq!(*i, !*u);
        }
    }

    #[test]
    fn shifted_adds_scalar_to_every_row() {
        let mut rng = StdRng::seed_from_u64(0);
        let d = 15;
        let a = DMatrix::<f64>::identity(d, d) + 0.5 * randn::standard_normal_matrix(d, d, &mut rng);
        let b = DVector::from_fn(d, |_, _| rng.gen::<f64>());
        let lincon = LinearConstraints::new(a, b, Mode::Intersection).unwrap();
        let shifted = lincon.shifted(1.0);

        let x = randn::standard_normal_matrix(d, 7, &mut rng);
        let base = lincon.evaluate(&x);
        let relaxed = shifted.evaluate(&x);
        for (u, v) in base.iter().zip(relaxed.iter()) {
            assert!((v - (u + 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn union_mode_accepts_single_satisfied_row() {
        let lincon = LinearConstraints::new(
            dmatrix![1.0, 0.0; 0.0, 1.0],
            dvector![-1.0, -1.0],
            Mode::Union,
        )
        .unwrap();
        assert!(lincon.contains(&dvector![2.0, 0.0]));
        assert!(!lincon.contains(&dvector![0.0, 0.0]));
    }
}
