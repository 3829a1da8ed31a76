//! Two-dimensional Lennard-Jones particle simulation.
//!
//! Two samplers share one pair-potential engine: Metropolis Monte Carlo with
//! single-particle moves, and velocity-Verlet molecular dynamics with an
//! Andersen thermostat. Both run under hard walls or a periodic box.

pub mod analysis;
pub mod core;
pub mod engine;
pub mod error;
pub mod solvers;

pub use crate::core::domain::{Boundary, Configuration, Method, Params, VectorField};
pub use crate::error::{Result, SimError};
