use serde::{Deserialize, Serialize};

/// Lennard-Jones pair law `U(r) = 4 eps [(sigma/r)^12 - (sigma/r)^6]`.
///
/// Works on squared distances to avoid `sqrt` in the pair loops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LennardJones {
    pub epsilon: f64,
    pub sigma: f64,
}

impl LennardJones {
    pub fn new(epsilon: f64, sigma: f64) -> Self {
        Self { epsilon, sigma }
    }

    #[inline]
    pub fn energy(&self, r2: f64) -> f64 {
        let inv_r2 = self.sigma * self.sigma / r2;
        let inv_r6 = inv_r2 * inv_r2 * inv_r2;
        4.0 * self.epsilon * (inv_r6 * inv_r6 - inv_r6)
    }

    /// `-dU/dr / r`. Multiply by the displacement `r_i - r_j` to get the force on `i`.
    #[inline]
    pub fn force_over_r(&self, r2: f64) -> f64 {
        let inv_r2 = self.sigma * self.sigma / r2;
        let inv_r6 = inv_r2 * inv_r2 * inv_r2;
        48.0 * self.epsilon * inv_r6 * (inv_r6 - 0.5) / r2
    }
}
