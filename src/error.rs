use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Buffer length {0} is not a multiple of the dimension (2)")]
    OddLength(usize),

    #[error("Dimension mismatch: expected {expected} components, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Particle index {index} out of range for {count} particles")]
    ParticleIndex { index: usize, count: usize },

    #[error("MD half-step still overlapping after {attempts} attempts (last dt = {last_dt:e})")]
    OverlapRecursionExceeded { attempts: usize, last_dt: f64 },

    #[error("No overlap-free displacement for particle {particle} after {attempts} proposals")]
    ProposalLimitExceeded { particle: usize, attempts: usize },

    #[error("Random packing failed: placed {placed} of {requested} particles")]
    PackingFailed { placed: usize, requested: usize },
}

pub type Result<T> = std::result::Result<T, SimError>;
