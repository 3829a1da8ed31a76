use std::sync::Arc;

use crate::core::domain::{Boundary, Configuration, Params, VectorField};
use crate::core::spatial;
use crate::engine::potential::LennardJones;
use crate::error::Result;

/// Pair Potential Engine.
/// Implementations are pure: identical inputs give identical outputs.
pub trait Evaluator: Send + Sync {
    /// Sum of pair energies between particle `i` and every other particle.
    fn energy_one_particle(&self, config: &Configuration, i: usize) -> Result<f64>;

    /// Sum over unordered pairs.
    fn total_energy(&self, config: &Configuration) -> f64;

    /// Force on every coordinate, i.e. the negative gradient of the total energy.
    fn forces(&self, config: &Configuration) -> VectorField;

    fn boundary(&self) -> Boundary;

    /// Returns the name of the engine (e.g., "LJ / hard walls").
    fn name(&self) -> &str;
}

/// Picks the evaluator for the run's boundary. Called once per run.
pub fn select(params: &Params) -> Arc<dyn Evaluator> {
    let lj = LennardJones::new(params.epsilon, params.sigma);
    match params.boundary {
        Boundary::Hard => Arc::new(HardWallEvaluator::new(lj)),
        Boundary::Periodic => {
            Arc::new(PeriodicEvaluator::new(lj, params.box_length, params.cutoff))
        }
    }
}

// Shared pair loops. `r2_of(i, j)` yields the squared distance under the caller's boundary.
fn one_particle<F>(
    config: &Configuration,
    i: usize,
    r2_of: F,
    lj: &LennardJones,
    r_cut_sq: f64,
) -> Result<f64>
where
    F: Fn(usize, usize) -> f64,
{
    config.check_index(i)?;
    let energy = (0..config.n_particles())
        .filter(|&j| j != i)
        .map(|j| r2_of(i, j))
        .filter(|&r2| r2 < r_cut_sq)
        .map(|r2| lj.energy(r2))
        .sum();
    Ok(energy)
}

fn pair_energy_sum<F>(
    config: &Configuration,
    r2_of: F,
    lj: &LennardJones,
    r_cut_sq: f64,
) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    let n = config.n_particles();
    let mut energy = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let r2 = r2_of(i, j);
            if r2 < r_cut_sq {
                energy += lj.energy(r2);
            }
        }
    }
    energy
}

fn pair_forces(
    config: &Configuration,
    boundary: Boundary,
    box_length: f64,
    lj: &LennardJones,
    r_cut_sq: f64,
) -> VectorField {
    let n = config.n_particles();
    let mut forces = VectorField::zeros(n);

    for i in 0..n {
        let p_i = config.position(i);
        for j in (i + 1)..n {
            // r_ij points from j to i
            let r_ij = spatial::displacement(&config.position(j), &p_i, boundary, box_length);
            let r2 = r_ij.norm_squared();
            if r2 >= r_cut_sq {
                continue;
            }
            let f_ij = r_ij * lj.force_over_r(r2);
            forces.add_to(i, f_ij);
            forces.add_to(j, -f_ij);
        }
    }
    forces
}

// --- Hard Walls ---

/// Raw Euclidean displacements, no truncation.
#[derive(Debug, Clone)]
pub struct HardWallEvaluator {
    lj: LennardJones,
}

impl HardWallEvaluator {
    pub fn new(lj: LennardJones) -> Self {
        Self { lj }
    }

    fn r2(config: &Configuration, i: usize, j: usize) -> f64 {
        nalgebra::distance_squared(&config.position(i), &config.position(j))
    }
}

impl Evaluator for HardWallEvaluator {
    fn energy_one_particle(&self, config: &Configuration, i: usize) -> Result<f64> {
        one_particle(config, i, |a, b| Self::r2(config, a, b), &self.lj, f64::INFINITY)
    }

    fn total_energy(&self, config: &Configuration) -> f64 {
        pair_energy_sum(config, |a, b| Self::r2(config, a, b), &self.lj, f64::INFINITY)
    }

    fn forces(&self, config: &Configuration) -> VectorField {
        pair_forces(config, Boundary::Hard, 0.0, &self.lj, f64::INFINITY)
    }

    fn boundary(&self) -> Boundary {
        Boundary::Hard
    }

    fn name(&self) -> &str {
        "LJ / hard walls"
    }
}

// --- Periodic Box ---

/// Minimum-image displacements in a square box of side `box_length`.
/// Pairs at or beyond `cutoff` are skipped in energies and forces alike.
#[derive(Debug, Clone)]
pub struct PeriodicEvaluator {
    lj: LennardJones,
    box_length: f64,
    r_cut_sq: f64,
}

impl PeriodicEvaluator {
    pub fn new(lj: LennardJones, box_length: f64, cutoff: Option<f64>) -> Self {
        let r_cut_sq = cutoff.map_or(f64::INFINITY, |rc| rc * rc);
        Self {
            lj,
            box_length,
            r_cut_sq,
        }
    }

    fn r2(&self, config: &Configuration, i: usize, j: usize) -> f64 {
        spatial::distance_sq(
            &config.position(i),
            &config.position(j),
            Boundary::Periodic,
            self.box_length,
        )
    }
}

impl Evaluator for PeriodicEvaluator {
    fn energy_one_particle(&self, config: &Configuration, i: usize) -> Result<f64> {
        one_particle(config, i, |a, b| self.r2(config, a, b), &self.lj, self.r_cut_sq)
    }

    fn total_energy(&self, config: &Configuration) -> f64 {
        pair_energy_sum(config, |a, b| self.r2(config, a, b), &self.lj, self.r_cut_sq)
    }

    fn forces(&self, config: &Configuration) -> VectorField {
        pair_forces(config, Boundary::Periodic, self.box_length, &self.lj, self.r_cut_sq)
    }

    fn boundary(&self) -> Boundary {
        Boundary::Periodic
    }

    fn name(&self) -> &str {
        "LJ / periodic"
    }
}
