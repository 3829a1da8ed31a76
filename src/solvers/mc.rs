use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use rand::Rng;

use crate::core::domain::{Configuration, Params};
use crate::core::spatial;
use crate::engine::evaluator::Evaluator;
use crate::engine::operators::Displacement;
use crate::error::{Result, SimError};
use crate::solvers::{SolverEvent, StepStats};

/// Result of one Metropolis move.
#[derive(Debug, Clone)]
pub struct McOutcome {
    /// The trial configuration if accepted, otherwise the input unchanged.
    pub configuration: Configuration,
    /// Energy change of the moved particle, reported even on rejection.
    pub delta_energy: f64,
    pub accepted: bool,
    /// Which particle was moved.
    pub particle: usize,
    /// Proposals discarded for overlap before the trial was found.
    pub rejected_proposals: usize,
}

/// Metropolis criterion: accept iff `U(0,1) < exp(-beta * dE)`.
/// `dE <= 0` always accepts.
pub fn metropolis_accept<R: Rng + ?Sized>(delta_energy: f64, beta: f64, rng: &mut R) -> bool {
    rng.gen::<f64>() < (-beta * delta_energy).exp()
}

/// Metropolis Monte Carlo sampler with single-particle moves.
pub struct MonteCarlo {
    evaluator: Arc<dyn Evaluator>,
    params: Params,
    displacement: Displacement,
}

impl MonteCarlo {
    pub fn new(evaluator: Arc<dyn Evaluator>, params: Params) -> Result<Self> {
        params.validate()?;
        let displacement = Displacement::new(params.delta, evaluator.boundary(), params.box_length);
        Ok(Self {
            evaluator,
            params,
            displacement,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Proposal loop: displaces particle `k` from its original position until the
    /// trial has no pair closer than `sigma` involving `k`.
    ///
    /// Returns the trial and the number of discarded proposals.
    pub fn propose_move<R: Rng + ?Sized>(
        &self,
        config: &Configuration,
        k: usize,
        rng: &mut R,
    ) -> Result<(Configuration, usize)> {
        config.check_index(k)?;
        let boundary = self.evaluator.boundary();

        for attempt in 0..self.params.max_proposals {
            let trial = self.displacement.apply(config, k, rng);
            if !spatial::particle_overlaps(
                &trial,
                k,
                self.params.sigma,
                boundary,
                self.params.box_length,
            ) {
                return Ok((trial, attempt));
            }
        }

        Err(SimError::ProposalLimitExceeded {
            particle: k,
            attempts: self.params.max_proposals,
        })
    }

    /// One Monte Carlo move: pick a particle uniformly, propose an overlap-free
    /// displacement, then accept or reject with the Metropolis criterion.
    pub fn mc_move<R: Rng + ?Sized>(&self, config: &Configuration, rng: &mut R) -> Result<McOutcome> {
        let n = config.n_particles();
        if n == 0 {
            return Err(SimError::ParticleIndex { index: 0, count: 0 });
        }
        let k = rng.gen_range(0..n);

        let energy_before = self.evaluator.energy_one_particle(config, k)?;
        let (trial, rejected_proposals) = self.propose_move(config, k, rng)?;
        let energy_after = self.evaluator.energy_one_particle(&trial, k)?;
        let delta_energy = energy_after - energy_before;

        let accepted = metropolis_accept(delta_energy, self.params.beta(), rng);
        let configuration = if accepted { trial } else { config.clone() };

        Ok(McOutcome {
            configuration,
            delta_energy,
            accepted,
            particle: k,
            rejected_proposals,
        })
    }

    /// Runs `params.steps` moves from `start`, reporting on `tx`. Returns the final configuration.
    pub fn solve<R: Rng + ?Sized>(
        &self,
        start: Configuration,
        rng: &mut R,
        tx: &Sender<SolverEvent>,
    ) -> Result<Configuration> {
        let steps = self.params.steps;
        info!(
            "MC start: {} particles, {} steps, {} (T = {}, delta = {})",
            start.n_particles(),
            steps,
            self.evaluator.name(),
            self.params.temperature,
            self.params.delta
        );

        if spatial::check_overlap(
            &start,
            self.params.sigma,
            self.evaluator.boundary(),
            self.params.box_length,
        ) {
            warn!("Starting configuration already contains overlapping pairs");
            let _ = tx.send(SolverEvent::Log("Warning: start configuration overlaps".to_string()));
        }

        let start_time = Instant::now();
        let mut current = start;
        let mut energy = self.evaluator.total_energy(&current);
        let mut accepted_count = 0usize;
        let mut retries = 0usize;

        for step in 1..=steps {
            let outcome = match self.mc_move(&current, rng) {
                Ok(o) => o,
                Err(e) => {
                    let _ = tx.send(SolverEvent::Log(format!("MC step {} failed: {}", step, e)));
                    let _ = tx.send(SolverEvent::Finished);
                    return Err(e);
                }
            };

            retries += outcome.rejected_proposals;
            if outcome.accepted {
                accepted_count += 1;
                energy += outcome.delta_energy;
            }
            current = outcome.configuration;

            debug!(
                "MC step {}: particle {} dE = {:.6} accepted = {}",
                step, outcome.particle, outcome.delta_energy, outcome.accepted
            );

            let due = self.params.report_every > 0 && step % self.params.report_every == 0;
            if due || step == steps {
                let stats = StepStats {
                    step,
                    potential_energy: energy,
                    kinetic_energy: 0.0,
                    temperature: self.params.temperature,
                    acceptance_ratio: accepted_count as f64 / step as f64,
                    retries,
                };
                let _ = tx.send(SolverEvent::StepUpdate(stats));
            }
        }

        let duration = start_time.elapsed().as_secs_f64();
        let msg = format!(
            "MC Finished. Acceptance: {}/{} ({:.1} moves/s)",
            accepted_count,
            steps,
            if duration > 0.0 { steps as f64 / duration } else { 0.0 }
        );
        info!("{}", msg);
        let _ = tx.send(SolverEvent::Log(msg));
        let _ = tx.send(SolverEvent::Finished);

        Ok(current)
    }
}
