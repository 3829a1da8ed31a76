use lj2d::core::domain::{Boundary, Configuration, Params};
use lj2d::engine::evaluator::{self, Evaluator, HardWallEvaluator, PeriodicEvaluator};
use lj2d::engine::potential::LennardJones;
use lj2d::error::SimError;

use crate::common::{config, params};

mod common;

fn cluster() -> Configuration {
    config(&[1.0, 1.0, 2.2, 1.3, 1.6, 2.4, 3.1, 2.9, 0.6, 3.4])
}

fn numerical_force(ev: &dyn Evaluator, c: &Configuration, idx: usize) -> f64 {
    let h = 1e-6;
    let mut plus = c.as_slice().to_vec();
    let mut minus = c.as_slice().to_vec();
    plus[idx] += h;
    minus[idx] -= h;
    let e_plus = ev.total_energy(&Configuration::from_flat(plus).unwrap());
    let e_minus = ev.total_energy(&Configuration::from_flat(minus).unwrap());
    -(e_plus - e_minus) / (2.0 * h)
}

#[test]
fn test_single_particle_has_no_interactions() {
    let c = config(&[4.0, 4.0]);
    for boundary in [Boundary::Hard, Boundary::Periodic] {
        let ev = evaluator::select(&params(boundary));
        assert_eq!(ev.energy_one_particle(&c, 0).unwrap(), 0.0);
        assert_eq!(ev.total_energy(&c), 0.0);
        assert_eq!(ev.forces(&c).as_slice(), &[0.0, 0.0]);
    }
}

#[test]
fn test_particle_index_checked() {
    let ev = evaluator::select(&params(Boundary::Hard));
    let res = ev.energy_one_particle(&cluster(), 5);
    assert!(matches!(res, Err(SimError::ParticleIndex { index: 5, count: 5 })));
}

#[test]
fn test_total_energy_is_half_the_particle_sum() {
    let c = cluster();
    for boundary in [Boundary::Hard, Boundary::Periodic] {
        let ev = evaluator::select(&Params { box_length: 4.0, ..params(boundary) });
        let per_particle: f64 = (0..c.n_particles())
            .map(|i| ev.energy_one_particle(&c, i).unwrap())
            .sum();
        let total = ev.total_energy(&c);
        assert!((0.5 * per_particle - total).abs() < 1e-9 * total.abs().max(1.0));
    }
}

#[test]
fn test_forces_are_negative_gradient() {
    let c = cluster();
    let lj = LennardJones::new(1.0, 1.0);
    let hard = HardWallEvaluator::new(lj);
    let periodic = PeriodicEvaluator::new(lj, 4.0, None);

    for ev in [&hard as &dyn Evaluator, &periodic as &dyn Evaluator] {
        let f = ev.forces(&c);
        for idx in 0..c.as_slice().len() {
            let expected = numerical_force(ev, &c, idx);
            let got = f.as_slice()[idx];
            assert!(
                (expected - got).abs() < 1e-4 * expected.abs().max(1.0),
                "{}: component {} analytic {} numeric {}",
                ev.name(),
                idx,
                got,
                expected
            );
        }
    }
}

#[test]
fn test_forces_sum_to_zero() {
    let ev = evaluator::select(&params(Boundary::Periodic));
    let f = ev.forces(&cluster());
    let (fx, fy) = f
        .as_slice()
        .chunks_exact(2)
        .fold((0.0, 0.0), |acc, c| (acc.0 + c[0], acc.1 + c[1]));
    assert!(fx.abs() < 1e-9 && fy.abs() < 1e-9);
}

#[test]
fn test_periodic_pair_across_wall_matches_direct_pair() {
    let lj = LennardJones::new(1.0, 1.0);
    let ev = PeriodicEvaluator::new(lj, 10.0, None);
    let across = config(&[0.3, 5.0, 9.1, 5.0]); // image separation 1.2
    let direct = config(&[4.0, 5.0, 5.2, 5.0]);
    let e_across = ev.energy_one_particle(&across, 0).unwrap();
    let e_direct = ev.energy_one_particle(&direct, 0).unwrap();
    assert!((e_across - e_direct).abs() < 1e-9);
    assert!((e_direct - lj.energy(1.2 * 1.2)).abs() < 1e-12);

    // 1.2 is past the minimum, so particle 0 is pulled across the wall towards -x
    assert!(ev.forces(&across).as_slice()[0] < 0.0);

    let hard = HardWallEvaluator::new(lj);
    assert!(hard.energy_one_particle(&across, 0).unwrap().abs() < 1e-4);
}

#[test]
fn test_cutoff_truncates_interactions() {
    let lj = LennardJones::new(1.0, 1.0);
    let c = config(&[1.0, 1.0, 4.0, 1.0]);
    let truncated = PeriodicEvaluator::new(lj, 20.0, Some(2.5));
    let full = PeriodicEvaluator::new(lj, 20.0, None);

    assert_eq!(truncated.total_energy(&c), 0.0);
    assert!(truncated.forces(&c).as_slice().iter().all(|&f| f == 0.0));
    assert!(full.total_energy(&c) < 0.0);
}

#[test]
fn test_evaluation_is_deterministic() {
    let ev = evaluator::select(&params(Boundary::Periodic));
    let c = cluster();
    assert_eq!(ev.forces(&c), ev.forces(&c));
    assert_eq!(ev.total_energy(&c), ev.total_energy(&c));
}

#[test]
fn test_select_follows_boundary() {
    assert_eq!(evaluator::select(&params(Boundary::Hard)).boundary(), Boundary::Hard);
    assert_eq!(evaluator::select(&params(Boundary::Periodic)).boundary(), Boundary::Periodic);
}
