//! Crossings between an ellipse and the domain boundary.
//!
//! Purpose
//! - Solve `a_i · x(θ) + b_i = 0` for every constraint in closed form and
//!   keep only the angles where the ellipse actually enters or leaves the
//!   integration domain.
//! - Order the survivors so that consecutive pairs bound in-domain arcs,
//!   which is the exact 1-D slice the elliptical slice sampler draws from.
//!
//! Method
//! - With `g1 = A a1`, `g2 = A a2` and `r = √(g1² + g2²)`, each constraint
//!   becomes `cos(θ − φ) = −b/r` with `φ = 2 atan(g2 / (r + g1))` (half-angle
//!   form, avoids the quadrant ambiguity of a plain `atan`). `|−b/r| > 1`
//!   means the ellipse never touches that hyperplane.
//! - Whether a root is a true domain crossing is decided by probing the
//!   indicator at `θ ± δθ`. Near-tangential roots can leave an odd count;
//!   the probe angle is then shrunk a bounded number of times.

use rand::Rng;

use crate::cfg;
use crate::constraints::LinearConstraints;
use crate::error::Error;

use super::ellipse::Ellipse;

/// Boundary crossings of one ellipse, ordered so that even/odd index pairs
/// delimit in-domain arcs.
#[derive(Clone, Debug)]
pub struct ActiveArcs {
    /// Crossing angles in `[0, 2π]`; even count. `[0, 2π]` alone encodes a
    /// crossing-free ellipse.
    pub angles: Vec<f64>,
    /// False iff the ellipse has no crossing and lies entirely outside.
    pub ellipse_in_domain: bool,
}

/// Same arcs re-expressed relative to the first crossing angle.
#[derive(Clone, Debug)]
pub struct RotatedArcs {
    /// The first crossing angle; add it back to every drawn angle.
    pub rotation: f64,
    /// Angles relative to `rotation`, wrapped into `[0, 2π]`, starting at 0.
    pub angles: Vec<f64>,
    pub ellipse_in_domain: bool,
}

/// Intersection solver for one ellipse against one constraint set.
pub struct ActiveIntersections<'a> {
    ellipse: &'a Ellipse,
    lincon: &'a LinearConstraints,
}

impl<'a> ActiveIntersections<'a> {
    pub fn new(ellipse: &'a Ellipse, lincon: &'a LinearConstraints) -> Self {
        debug_assert_eq!(ellipse.dim(), lincon.n_dim());
        Self { ellipse, lincon }
    }

    /// All of the up to 2M root angles, normalized to `[0, 2π]` and sorted.
    ///
    /// Constraints whose hyperplane misses the ellipse contribute nothing;
    /// so do constraints that are constant along the ellipse (`r = 0`) or
    /// yield a non-finite phase.
    pub fn intersection_angles(&self) -> Vec<f64> {
        let g1 = self.lincon.matrix() * self.ellipse.a1();
        let g2 = self.lincon.matrix() * self.ellipse.a2();
        let b = self.lincon.offset();

        let mut angles = Vec::with_capacity(2 * self.lincon.n_constraints());
        for i in 0..self.lincon.n_constraints() {
            let r = g1[i].hypot(g2[i]);
            let arg = -b[i] / r;
            if !(arg.abs() <= 1.0) {
                continue;
            }
            let phi = 2.0 * (g2[i] / (r + g1[i])).atan();
            let spread = arg.acos();
            for theta in [phi + spread, phi - spread] {
                if !theta.is_finite() {
                    continue;
                }
                angles.push(if theta < 0.0 {
                    theta + std::f64::consts::TAU
                } else {
                    theta
                });
            }
        }
        angles.sort_by(f64::total_cmp);
        angles
    }

    /// Keep the roots where the domain indicator flips, ordered to start
    /// with an entering crossing.
    ///
    /// The RNG is only consulted for the crossing-free case, where a single
    /// probe angle decides whether the whole ellipse is inside or outside.
    pub fn find_active_intersections<R: Rng>(&self, rng: &mut R) -> Result<ActiveArcs, Error> {
        let roots = self.intersection_angles();

        let mut delta_theta = cfg::DELTA_THETA_INIT;
        let mut reductions = 0;
        let active = loop {
            let active = self.crossing_directions(&roots, delta_theta);
            if active.len() % 2 == 0 {
                break active;
            }
            // Almost tangential ellipse; shrink the probe angle and retry.
            if reductions == cfg::MAX_TANGENCY_REDUCTIONS {
                return Err(Error::DegenerateIntersections { reductions });
            }
            reductions += 1;
            delta_theta *= cfg::DELTA_THETA_SHRINK;
            tracing::debug!(delta_theta, "odd crossing count, shrinking probe angle");
        };

        if active.is_empty() {
            let probe = rng.gen::<f64>() * std::f64::consts::TAU;
            let inside = self.lincon.contains(&self.ellipse.x(probe));
            return Ok(ActiveArcs {
                angles: vec![0.0, std::f64::consts::TAU],
                ellipse_in_domain: inside,
            });
        }

        let mut angles: Vec<f64> = active.iter().map(|&(theta, _)| theta).collect();
        if active[0].1 < 0 {
            // First crossing leaves the domain: rotate so pairs open inward.
            angles.rotate_left(1);
        }
        Ok(ActiveArcs {
            angles,
            ellipse_in_domain: true,
        })
    }

    /// Active crossings re-expressed relative to the first one, so that the
    /// arcs form a simple concatenation starting at 0.
    pub fn rotated_intersections<R: Rng>(&self, rng: &mut R) -> Result<RotatedArcs, Error> {
        let arcs = self.find_active_intersections(rng)?;
        let rotation = arcs.angles[0];
        let angles = arcs
            .angles
            .iter()
            .map(|&theta| {
                let rel = theta - rotation;
                if rel < 0.0 {
                    rel + std::f64::consts::TAU
                } else {
                    rel
                }
            })
            .collect();
        Ok(RotatedArcs {
            rotation,
            angles,
            ellipse_in_domain: arcs.ellipse_in_domain,
        })
    }

    /// Probe the indicator at `θ ± δθ`; +1 enters the domain, -1 leaves,
    /// 0 means the root does not touch the domain boundary.
    fn crossing_directions(&self, roots: &[f64], delta_theta: f64) -> Vec<(f64, i8)> {
        roots
            .iter()
            .filter_map(|&theta| {
                let after = self.lincon.contains(&self.ellipse.x(theta + delta_theta));
                let before = self.lincon.contains(&self.ellipse.x(theta - delta_theta));
                let dir = after as i8 - before as i8;
                (dir != 0).then_some((theta, dir))
            })
            .collect()
    }
}
