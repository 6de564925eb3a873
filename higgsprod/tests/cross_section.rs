//! End-to-end runs of the integrator, checked against a deterministic
//! midpoint quadrature of the same integrand.

use higgsprod::constants::PBCONV;
use higgsprod::couplings::CouplingSet;
use higgsprod::pdf::ToyPdf;
use higgsprod::phase_space_generator::CosThetaMap;
use higgsprod::{Integrand, Integrator, IntegratorSettings, Process, RunCard};

/// Midpoint rule over the unit hypercube with `n[i]` cells along axis `i`.
///
/// Axis `i` is sampled through `u = 1 - (1 - v)^p[i]`, which refines the grid
/// towards `u = 1` where the `ŝ` map squeezes the high-energy tail.
fn quadrature(integrand: &Integrand, n: &[usize], p: &[f64]) -> f64 {
    let total: usize = n.iter().product();
    let mut x = vec![0.; n.len()];
    let mut sum = 0.;
    for cell in 0..total {
        let mut rest = cell;
        let mut jac = 1.;
        for ((xi, &ni), &pi) in x.iter_mut().zip(n).zip(p) {
            let v = ((rest % ni) as f64 + 0.5) / ni as f64;
            *xi = 1. - (1. - v).powf(pi);
            jac *= pi * (1. - v).powf(pi - 1.);
            rest /= ni;
        }
        sum += integrand.evaluate_at(&x).unwrap() * jac;
    }
    sum / total as f64 * PBCONV
}

fn assert_compatible(mc: f64, err: f64, reference: f64) {
    assert!(err > 0. && err < 0.1 * mc, "poor estimate: {} +- {}", mc, err);
    assert!(
        (mc - reference).abs() < 3. * err,
        "MC {} +- {} is incompatible with the reference {}",
        mc,
        err,
        reference
    );
}

#[test]
fn resonant_production_matches_quadrature() {
    let pdf = ToyPdf::default();
    // Γ = m / 10000, with the sampling map matched to the lineshape
    let card = RunCard {
        process: Process::Resonant,
        width_ratio: 1e-4,
        n_iterations: 10_000,
        batch_size: 2_500,
        cores: 2,
        seed: 20170301,
        ..RunCard::default()
    };
    let couplings = CouplingSet::new(2., 0.1).unwrap();

    let integrand = Integrand::new(125., couplings.clone(), &card, &pdf).unwrap();
    let reference = quadrature(&integrand, &[400, 200], &[1., 1.]);
    assert!(reference > 0.);

    let integrand = Integrand::new(125., couplings, &card, &pdf).unwrap();
    let result = Integrator::new(integrand, IntegratorSettings::from(&card))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.n_points, 10_000);
    assert_compatible(result.cross_section, result.error, reference);
}

#[test]
fn associated_production_matches_quadrature() {
    let pdf = ToyPdf::default();
    // with flat cos θ sampling, cos θ ∈ [-1, 0.5] keeps clear of the collinear
    // b-exchange peak at cos θ = 1
    let card = RunCard {
        process: Process::Associated,
        cos_theta_range: 1.5,
        cos_theta_map: CosThetaMap::Flat,
        n_iterations: 20_000,
        batch_size: 5_000,
        cores: 4,
        seed: 7,
        ..RunCard::default()
    };
    let couplings = CouplingSet::new(5., 0.2).unwrap();

    let integrand = Integrand::new(300., couplings.clone(), &card, &pdf).unwrap();
    // φ does not enter the weight
    let reference = quadrature(&integrand, &[200, 40, 16, 1], &[3., 1., 1., 1.]);
    assert!(reference > 0.);

    let integrand = Integrand::new(300., couplings, &card, &pdf).unwrap();
    let result = Integrator::new(integrand, IntegratorSettings::from(&card))
        .unwrap()
        .run()
        .unwrap();

    assert_compatible(result.cross_section, result.error, reference);
}

/// MC run and quadrature over the full `cos θ` range with the propagator map.
fn full_range_against_quadrature(process: Process, mass: f64, seed: u64) {
    let pdf = ToyPdf::default();
    let card = RunCard {
        process,
        cos_theta_map: CosThetaMap::Propagator,
        n_iterations: 40_000,
        batch_size: 10_000,
        cores: 4,
        seed,
        ..RunCard::default()
    };
    let couplings = CouplingSet::new(5., 0.2).unwrap();

    let integrand = Integrand::new(mass, couplings.clone(), &card, &pdf).unwrap();
    // the map leaves an e^{-r ln(ŝ/m_b²)} tail at r_cos -> 0, hence the finer axis
    let reference = quadrature(&integrand, &[200, 40, 48, 1], &[3., 1., 1., 1.]);
    assert!(reference > 0.);

    let integrand = Integrand::new(mass, couplings, &card, &pdf).unwrap();
    let result = Integrator::new(integrand, IntegratorSettings::from(&card))
        .unwrap()
        .run()
        .unwrap();

    assert_compatible(result.cross_section, result.error, reference);
}

#[test]
fn associated_production_over_full_angular_range() {
    full_range_against_quadrature(Process::Associated, 300., 17);
}

#[test]
fn charged_production_matches_quadrature() {
    full_range_against_quadrature(Process::Charged, 300., 23);
}

#[test]
fn narrower_cos_range_reduces_associated_rate() {
    let pdf = ToyPdf::default();
    let couplings = CouplingSet::new(5., 0.2).unwrap();
    let full = RunCard {
        process: Process::Associated,
        ..RunCard::default()
    };
    let half = RunCard {
        cos_theta_range: 1.,
        ..full.clone()
    };

    let (n, p) = ([40, 20, 12, 1], [3., 1., 1., 1.]);
    let sigma_full = quadrature(&Integrand::new(300., couplings.clone(), &full, &pdf).unwrap(), &n, &p);
    let sigma_half = quadrature(&Integrand::new(300., couplings, &half, &pdf).unwrap(), &n, &p);
    assert!(sigma_half > 0. && sigma_half < sigma_full);
}

#[test]
fn worker_count_does_not_bias_the_estimate() {
    let pdf = ToyPdf::default();
    let couplings = CouplingSet::new(2., 0.1).unwrap();
    let run = |cores: usize| {
        let card = RunCard {
            n_iterations: 10_000,
            batch_size: 10_000,
            cores,
            seed: 99,
            ..RunCard::default()
        };
        let integrand = Integrand::new(125., couplings.clone(), &card, &pdf).unwrap();
        Integrator::new(integrand, IntegratorSettings::from(&card))
            .unwrap()
            .run()
            .unwrap()
    };

    let one = run(1);
    let four = run(4);
    let combined_err = (one.error.powi(2) + four.error.powi(2)).sqrt();
    assert!((one.cross_section - four.cross_section).abs() < 4. * combined_err);
}
