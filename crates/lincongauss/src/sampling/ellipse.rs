//! The 1-parameter curve `x(θ) = a1 cos θ + a2 sin θ` in `R^D`.

use nalgebra::{DMatrix, DVector};

use crate::error::Error;

/// Origin-centered ellipse spanned by two vectors. Immutable, no state.
#[derive(Clone, Debug)]
pub struct Ellipse {
    a1: DVector<f64>,
    a2: DVector<f64>,
}

impl Ellipse {
    pub fn new(a1: DVector<f64>, a2: DVector<f64>) -> Result<Self, Error> {
        if a1.len() != a2.len() {
            return Err(Error::shape("ellipse axis a2", a1.len(), a2.len()));
        }
        Ok(Self { a1, a2 })
    }

    /// Ambient dimension D.
    #[inline]
    pub fn dim(&self) -> usize {
        self.a1.len()
    }

    #[inline]
    pub fn a1(&self) -> &DVector<f64> {
        &self.a1
    }

    #[inline]
    pub fn a2(&self) -> &DVector<f64> {
        &self.a2
    }

    /// Location on the ellipse at angle `theta`.
    pub fn x(&self, theta: f64) -> DVector<f64> {
        &self.a1 * theta.cos() + &self.a2 * theta.sin()
    }

    /// Locations at several angles, one column per angle (D×len).
    pub fn x_many(&self, thetas: &[f64]) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.dim(), thetas.len());
        for (j, &t) in thetas.iter().enumerate() {
            out.set_column(j, &self.x(t));
        }
        out
    }
}
