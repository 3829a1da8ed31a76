#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use lj2d::core::domain::{Boundary, Configuration, Params, VectorField};
use lj2d::engine::evaluator::Evaluator;
use lj2d::error::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn config(coords: &[f64]) -> Configuration {
    Configuration::from_flat(coords.to_vec()).expect("even-length buffer")
}

pub fn field(components: &[f64]) -> VectorField {
    VectorField::from_flat(components.to_vec()).expect("even-length buffer")
}

pub fn params(boundary: Boundary) -> Params {
    Params {
        boundary,
        box_length: 10.0,
        sigma: 1.0,
        epsilon: 1.0,
        temperature: 1.0,
        ..Default::default()
    }
}

/// Returns `step * n` on its n-th energy call, so every MC move sees `dE = step`.
pub struct SequenceEvaluator {
    step: f64,
    calls: AtomicUsize,
    boundary: Boundary,
}

impl SequenceEvaluator {
    pub fn new(step: f64, boundary: Boundary) -> Self {
        Self {
            step,
            calls: AtomicUsize::new(0),
            boundary,
        }
    }
}

impl Evaluator for SequenceEvaluator {
    fn energy_one_particle(&self, config: &Configuration, i: usize) -> Result<f64> {
        config.check_index(i)?;
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(self.step * n as f64)
    }

    fn total_energy(&self, _config: &Configuration) -> f64 {
        0.0
    }

    fn forces(&self, config: &Configuration) -> VectorField {
        VectorField::zeros(config.n_particles())
    }

    fn boundary(&self) -> Boundary {
        self.boundary
    }

    fn name(&self) -> &str {
        "Mock Sequence Evaluator"
    }
}

pub fn min_pair_distance(config: &Configuration) -> f64 {
    let n = config.n_particles();
    let mut best = f64::INFINITY;
    for i in 0..n {
        for j in (i + 1)..n {
            best = best.min((config.position(i) - config.position(j)).norm());
        }
    }
    best
}
