use serde::Serialize;

/// Snapshot of a sampling run, emitted every `report_every` steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepStats {
    pub step: usize,
    pub potential_energy: f64,

    /// MD only (0.0 for Monte Carlo).
    pub kinetic_energy: f64,
    pub temperature: f64,

    /// Fraction of MC moves accepted so far. Always 1.0 for MD.
    pub acceptance_ratio: f64,

    /// MC: proposals thrown away for overlap. MD: half-steps that had to shrink dt.
    pub retries: usize,
}

impl StepStats {
    pub fn total_energy(&self) -> f64 {
        self.potential_energy + self.kinetic_energy
    }
}

/// Events emitted by solvers to the driver.
#[derive(Debug, Clone)]
pub enum SolverEvent {
    /// Diagnostic log message.
    Log(String),

    /// Periodic statistics.
    StepUpdate(StepStats),

    /// Solver has finished its run.
    Finished,
}

pub mod mc;
pub mod md;
