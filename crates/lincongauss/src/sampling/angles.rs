//! Uniform draws from a union of in-domain arcs.

use rand::Rng;

use crate::error::Error;

use super::intersections::RotatedArcs;

/// Draws an angle uniformly from rotated arcs `[(0, e1), (s2, e2), ...]`.
///
/// Invariants:
/// - Arc bounds are relative to `rotation` and nondecreasing; the total
///   length is at most `2π`.
#[derive(Clone, Debug)]
pub struct AngleSampler {
    rotation: f64,
    slices: Vec<(f64, f64)>,
    /// Prefix sums of arc lengths with a leading zero; `cum_len.last()` is
    /// the total measure.
    cum_len: Vec<f64>,
}

impl AngleSampler {
    pub fn new(arcs: &RotatedArcs) -> Result<Self, Error> {
        if !arcs.ellipse_in_domain {
            return Err(Error::NotInDomain {
                what: "slice ellipse",
            });
        }
        if arcs.angles.is_empty() || arcs.angles.len() % 2 != 0 {
            return Err(Error::invalid(format!(
                "arc angles must come in pairs, got {}",
                arcs.angles.len()
            )));
        }
        let slices: Vec<(f64, f64)> = arcs.angles.chunks(2).map(|p| (p[0], p[1])).collect();
        let mut cum_len = Vec::with_capacity(slices.len() + 1);
        cum_len.push(0.0);
        let mut acc = 0.0;
        for &(start, end) in &slices {
            acc += end - start;
            cum_len.push(acc);
        }
        if !(acc > 0.0) {
            return Err(Error::invalid("in-domain arcs have zero total length"));
        }
        Ok(Self {
            rotation: arcs.rotation,
            slices,
            cum_len,
        })
    }

    /// Total angular measure of the in-domain arcs.
    #[inline]
    pub fn total_length(&self) -> f64 {
        self.cum_len[self.slices.len()]
    }

    /// Draw one angle uniformly from the arcs, in the original (unrotated)
    /// frame.
    pub fn draw_angle<R: Rng>(&self, rng: &mut R) -> f64 {
        let u = self.total_length() * rng.gen::<f64>();
        // Smallest k with cum_len[k] >= u, then step back to the arc start.
        let k = self
            .cum_len
            .partition_point(|&c| c < u)
            .saturating_sub(1)
            .min(self.slices.len() - 1);
        self.slices[k].0 + (u - self.cum_len[k]) + self.rotation
    }
}
