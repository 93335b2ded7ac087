//! End-to-end scenarios combining the sampler and both integrators.

use nalgebra::{dmatrix, dvector, DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constraints::{LinearConstraints, Mode};
use crate::randn;
use crate::sampling::{ActiveIntersections, AngleSampler, Ellipse, EllipticalSliceSampler};
use crate::splitting::{Hdr, SubsetSimulation};

/// Φ(-3), the standard normal CDF at -3.
const PHI_MINUS_3: f64 = 1.349_898_031_630_094_5e-3;

fn triangle() -> LinearConstraints {
    let s = 3.0f64.sqrt();
    LinearConstraints::new(
        dmatrix![0.0, 1.0; -s, -1.0; s, -1.0],
        (s / 6.0) * dvector![1.0, 2.0, 2.0],
        Mode::Intersection,
    )
    .unwrap()
}

/// A random 5-constraint domain in R^3 together with an in-domain point.
///
/// Randomly drawn domains are occasionally empty, so seeds are tried in
/// order until rejection sampling finds a starting point.
fn random_domain() -> (LinearConstraints, DVector<f64>) {
    for seed in 0..16 {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = 2.0 * randn::standard_normal_matrix(5, 3, &mut rng);
        let b = randn::standard_normal_vector(5, &mut rng);
        let lincon = LinearConstraints::new(a, b, Mode::Intersection).unwrap();
        if let Ok(x0) = EllipticalSliceSampler::find_starting_point(&lincon, &mut rng) {
            return (lincon, x0);
        }
    }
    panic!("no seed produced a nonempty random domain");
}

#[test]
fn angles_drawn_on_a_fixed_ellipse_stay_in_the_triangle() {
    let lincon = triangle();
    let ellipse = Ellipse::new(dvector![1.0 / 3.0, 0.0], dvector![0.0, 1.0 / 3.0]).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let arcs = ActiveIntersections::new(&ellipse, &lincon)
        .rotated_intersections(&mut rng)
        .unwrap();
    let sampler = AngleSampler::new(&arcs).unwrap();

    let angles: Vec<f64> = (0..100).map(|_| sampler.draw_angle(&mut rng)).collect();
    let points = ellipse.x_many(&angles);
    assert!(lincon.indicator(&points).iter().all(|&inside| inside));
}

#[test]
fn ess_confines_a_long_chain_to_a_random_domain() {
    let (lincon, x0) = random_domain();
    let x_init = DMatrix::from_columns(&[x0]);
    let mut sampler = EllipticalSliceSampler::new(1000, lincon.clone(), 0, &x_init).unwrap();
    sampler.run(&mut StdRng::seed_from_u64(100)).unwrap();

    let x = sampler.state().x();
    assert_eq!(x.ncols(), 1001);
    assert!(lincon.indicator(&x).iter().all(|&inside| inside));
}

#[test]
fn hdr_refines_a_subset_discovered_sequence() {
    let (lincon, _) = random_domain();
    let mut rng = StdRng::seed_from_u64(200);

    let mut subset = SubsetSimulation::new(lincon.clone(), 16, 0.5, 0).unwrap();
    subset.run(&mut rng).unwrap();
    let shifts = subset.tracker().shift_sequence();
    let x_inits = subset.tracker().x_inits().expect("subset keeps seeds");

    let mut hdr = Hdr::new(lincon, shifts, 100, x_inits, 0).unwrap();
    hdr.run(&mut rng).unwrap();

    assert!(hdr.tracker().is_complete());
    for p in hdr.tracker().nesting_factors() {
        assert!(p > 0.0 && p <= 1.0, "conditional probability {p} out of range");
    }
    let product: f64 = hdr.tracker().nesting_factors().iter().product();
    assert!((hdr.tracker().integral() - product).abs() < 1e-12 * product.max(1e-300));
}

#[test]
fn halfspace_probability_approaches_one_half() {
    // Pr[x >= 0] = 1/2 exactly; the estimate must match within Monte Carlo
    // error.
    let lincon =
        LinearConstraints::new(dmatrix![1.0], dvector![0.0], Mode::Intersection).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let mut subset = SubsetSimulation::new(lincon.clone(), 1000, 0.5, 1).unwrap();
    subset.run(&mut rng).unwrap();
    assert!((subset.tracker().integral() - 0.5).abs() < 0.05);

    let shifts = subset.tracker().shift_sequence();
    let x_inits = subset.tracker().x_inits().expect("subset keeps seeds");
    let mut hdr = Hdr::new(lincon, shifts, 2000, x_inits, 1).unwrap();
    hdr.run(&mut rng).unwrap();
    assert!((hdr.tracker().integral() - 0.5).abs() < 0.05);
}

#[test]
fn small_orthant_probability_is_recovered_within_a_factor_of_two() {
    // Pr[x >= 3, y >= 3] = Φ(-3)² ≈ 1.8e-6; naive Monte Carlo with these
    // batch sizes would almost never see the event.
    let lincon = LinearConstraints::new(
        dmatrix![1.0, 0.0; 0.0, 1.0],
        dvector![-3.0, -3.0],
        Mode::Intersection,
    )
    .unwrap();
    let truth = PHI_MINUS_3 * PHI_MINUS_3;
    let mut rng = StdRng::seed_from_u64(0);

    let mut subset = SubsetSimulation::new(lincon.clone(), 200, 0.5, 2).unwrap();
    subset.run(&mut rng).unwrap();
    let shifts = subset.tracker().shift_sequence();
    let x_inits = subset.tracker().x_inits().expect("subset keeps seeds");

    let mut hdr = Hdr::new(lincon.clone(), shifts, 1000, x_inits, 2).unwrap();
    hdr.run(&mut rng).unwrap();

    let log_err = (hdr.tracker().log_integral() - truth.ln()).abs();
    assert!(
        log_err < std::f64::consts::LN_2,
        "estimate {} vs truth {truth}",
        hdr.tracker().integral()
    );

    // The retained samples really are in the far orthant.
    if let Some(samples) = hdr.tracker().samples() {
        assert!(lincon.indicator(samples).iter().all(|&inside| inside));
    }
}

#[test]
fn full_pipeline_is_bit_reproducible_from_the_seed() {
    let (lincon, _) = random_domain();

    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut subset = SubsetSimulation::new(lincon.clone(), 32, 0.5, 0).unwrap();
        subset.run(&mut rng).unwrap();
        let shifts = subset.tracker().shift_sequence();
        let x_inits = subset.tracker().x_inits().unwrap();
        let mut hdr = Hdr::new(lincon.clone(), shifts.clone(), 64, x_inits, 0).unwrap();
        hdr.run(&mut rng).unwrap();
        (
            shifts,
            subset.tracker().log_factors(),
            hdr.tracker().log_factors(),
            hdr.tracker().samples().cloned(),
        )
    };

    assert_eq!(run(9), run(9));
}
