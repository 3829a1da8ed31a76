use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use rand::Rng;

use crate::core::domain::{Configuration, Params, VectorField};
use crate::core::spatial;
use crate::engine::evaluator::Evaluator;
use crate::engine::operators::gauss_distributed;
use crate::error::{Result, SimError};
use crate::solvers::{SolverEvent, StepStats};

/// Output of the first velocity-Verlet stage.
#[derive(Debug, Clone)]
pub struct HalfStep {
    pub configuration: Configuration,
    /// `v + dt_used * f / 2`
    pub velocities: VectorField,
    /// Timestep that produced an overlap-free configuration.
    pub dt_used: f64,
    /// How many times dt was divided by the shrink factor.
    pub shrinks: usize,
}

/// Result of one full MD step.
#[derive(Debug, Clone)]
pub struct MdStep {
    pub configuration: Configuration,
    pub velocities: VectorField,
    /// Forces on `configuration`, to be fed into the next step.
    pub forces: VectorField,
    pub shrinks: usize,
}

// Per-axis velocity-Verlet updates
#[inline]
fn kick(v: f64, f: f64, dt: f64) -> f64 {
    v + dt * f / 2.0
}

#[inline]
fn drift(x: f64, v: f64, f: f64, dt: f64) -> f64 {
    x + dt * v + dt * dt * f / 2.0
}

/// Velocity-Verlet integrator with Andersen thermostat (unit masses, k_B = 1).
pub struct MolecularDynamics {
    evaluator: Arc<dyn Evaluator>,
    params: Params,
}

impl MolecularDynamics {
    pub fn new(evaluator: Arc<dyn Evaluator>, params: Params) -> Result<Self> {
        params.validate()?;
        Ok(Self { evaluator, params })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Forces for the run's boundary.
    pub fn forces(&self, config: &Configuration) -> VectorField {
        self.evaluator.forces(config)
    }

    /// Stage 1: `x' = x + dt v + dt^2 f / 2` (folded into the box) and `v' = v + dt f / 2`.
    ///
    /// If any pair of the new configuration is closer than `sigma`, the whole stage is
    /// redone from the original buffers with `dt / shrink_factor`, at most `max_shrinks` times.
    pub fn half_step_positions_and_kick(
        &self,
        config: &Configuration,
        velocities: &VectorField,
        forces: &VectorField,
    ) -> Result<HalfStep> {
        velocities.check_shape(config)?;
        forces.check_shape(config)?;

        let boundary = self.evaluator.boundary();
        let l = self.params.box_length;
        let mut dt = self.params.dt;

        for shrinks in 0..=self.params.max_shrinks {
            let mut x_new = config.as_slice().to_vec();
            let mut v_new = velocities.clone();

            for (idx, (x, v)) in x_new.iter_mut().zip(v_new.as_mut_slice()).enumerate() {
                let f = forces.as_slice()[idx];
                *x = spatial::fold_coordinate(drift(*x, *v, f, dt), boundary, l);
                *v = kick(*v, f, dt);
            }

            let candidate = Configuration::from_flat(x_new)?;
            if !spatial::check_overlap(&candidate, self.params.sigma, boundary, l) {
                if shrinks > 0 {
                    debug!("MD half-step needed {} shrink(s), dt = {:e}", shrinks, dt);
                }
                return Ok(HalfStep {
                    configuration: candidate,
                    velocities: v_new,
                    dt_used: dt,
                    shrinks,
                });
            }

            if shrinks < self.params.max_shrinks {
                dt /= self.params.shrink_factor;
            }
        }

        Err(SimError::OverlapRecursionExceeded {
            attempts: self.params.max_shrinks + 1,
            last_dt: dt,
        })
    }

    /// Stage 2: `v'' = v' + dt f_new / 2`, then Andersen resampling: each component is
    /// replaced, with probability `nu * dt`, by a fresh N(0, sqrt(T)) sample.
    pub fn final_kick_and_thermostat<R: Rng + ?Sized>(
        &self,
        velocities: &VectorField,
        new_forces: &VectorField,
        rng: &mut R,
    ) -> Result<VectorField> {
        if velocities.as_slice().len() != new_forces.as_slice().len() {
            return Err(SimError::DimensionMismatch {
                expected: velocities.as_slice().len(),
                found: new_forces.as_slice().len(),
            });
        }

        let dt = self.params.dt;
        let collision_prob = self.params.nu * dt;
        let bath_sigma = self.params.temperature.sqrt();

        let mut out = velocities.clone();
        for (v, &f) in out.as_mut_slice().iter_mut().zip(new_forces.as_slice()) {
            *v = kick(*v, f, dt);
        }
        // Heat bath
        for v in out.as_mut_slice() {
            if rng.gen::<f64>() < collision_prob {
                *v = gauss_distributed(0.0, bath_sigma, rng);
            }
        }
        Ok(out)
    }

    /// One MD step: Stage 1, force recomputation at the new positions, Stage 2.
    ///
    /// Stage 2 and the thermostat use the configured `dt` even when Stage 1 had to shrink it.
    pub fn md_move<R: Rng + ?Sized>(
        &self,
        config: &Configuration,
        velocities: &VectorField,
        forces: &VectorField,
        rng: &mut R,
    ) -> Result<MdStep> {
        let half = self.half_step_positions_and_kick(config, velocities, forces)?;
        let new_forces = self.forces(&half.configuration);
        let new_velocities = self.final_kick_and_thermostat(&half.velocities, &new_forces, rng)?;

        Ok(MdStep {
            configuration: half.configuration,
            velocities: new_velocities,
            forces: new_forces,
            shrinks: half.shrinks,
        })
    }

    /// Runs `params.steps` MD steps from `(start, velocities)`, reporting on `tx`.
    /// Returns the final configuration and velocities.
    pub fn solve<R: Rng + ?Sized>(
        &self,
        start: Configuration,
        velocities: VectorField,
        rng: &mut R,
        tx: &Sender<SolverEvent>,
    ) -> Result<(Configuration, VectorField)> {
        velocities.check_shape(&start)?;
        let steps = self.params.steps;
        info!(
            "MD start: {} particles, {} steps, {} (dt = {}, T = {}, nu = {})",
            start.n_particles(),
            steps,
            self.evaluator.name(),
            self.params.dt,
            self.params.temperature,
            self.params.nu
        );

        let start_time = Instant::now();
        let mut forces = self.forces(&start);
        let mut config = start;
        let mut vel = velocities;
        let mut shrunk_steps = 0usize;

        for step in 1..=steps {
            let next = match self.md_move(&config, &vel, &forces, rng) {
                Ok(s) => s,
                Err(e) => {
                    let _ = tx.send(SolverEvent::Log(format!("MD step {} failed: {}", step, e)));
                    let _ = tx.send(SolverEvent::Finished);
                    return Err(e);
                }
            };

            if next.shrinks > 0 {
                shrunk_steps += 1;
                warn!("MD step {}: overlap forced {} dt reduction(s)", step, next.shrinks);
            }
            config = next.configuration;
            vel = next.velocities;
            forces = next.forces;

            let due = self.params.report_every > 0 && step % self.params.report_every == 0;
            if due || step == steps {
                let stats = StepStats {
                    step,
                    potential_energy: self.evaluator.total_energy(&config),
                    kinetic_energy: vel.kinetic_energy(),
                    temperature: vel.temperature(),
                    acceptance_ratio: 1.0,
                    retries: shrunk_steps,
                };
                let _ = tx.send(SolverEvent::StepUpdate(stats));
            }
        }

        let duration = start_time.elapsed().as_secs_f64();
        let msg = format!(
            "MD Finished. {} steps, {} with dt reduction ({:.1} steps/s)",
            steps,
            shrunk_steps,
            if duration > 0.0 { steps as f64 / duration } else { 0.0 }
        );
        info!("{}", msg);
        let _ = tx.send(SolverEvent::Log(msg));
        let _ = tx.send(SolverEvent::Finished);

        Ok((config, vel))
    }
}
