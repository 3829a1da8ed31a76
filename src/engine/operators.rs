use nalgebra::{Point2, Vector2};
use rand::Rng;

use crate::core::domain::{Boundary, Configuration, VectorField};
use crate::core::spatial;

/// Single-particle trial displacement.
#[derive(Clone, Copy, Debug)]
pub struct Displacement {
    max_step: f64,     // delta: each axis moves by U(-0.5, 0.5) * delta
    boundary: Boundary,
    box_length: f64,
}

impl Displacement {
    pub fn new(max_step: f64, boundary: Boundary, box_length: f64) -> Self {
        Self {
            max_step,
            boundary,
            box_length,
        }
    }

    /// Draws the offset for one proposal.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector2<f64> {
        Vector2::new(
            (rng.gen::<f64>() - 0.5) * self.max_step,
            (rng.gen::<f64>() - 0.5) * self.max_step,
        )
    }

    /// Moves particle `k` away from its position in `origin` and folds it back into the box.
    /// Every call starts from `origin`, never from a previous proposal.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        origin: &Configuration,
        k: usize,
        rng: &mut R,
    ) -> Configuration {
        let mut trial = origin.clone();
        let moved: Point2<f64> = origin.position(k) + self.sample(rng);
        trial.set_position(k, spatial::fold_point(moved, self.boundary, self.box_length));
        trial
    }
}

/// Polar (rejection) Gaussian sampler.
///
/// Draws `(v1, v2)` uniformly in `[-1, 1]^2` until `r = v1^2 + v2^2` lies in
/// `(0, 1]`, then returns `mu + sigma * v1 * sqrt(-2 ln r / r)`.
pub fn gauss_distributed<R: Rng + ?Sized>(mu: f64, sigma: f64, rng: &mut R) -> f64 {
    loop {
        let v1 = 2.0 * rng.gen::<f64>() - 1.0;
        let v2 = 2.0 * rng.gen::<f64>() - 1.0;
        let r = v1 * v1 + v2 * v2;
        if r > 0.0 && r <= 1.0 {
            return mu + sigma * v1 * (-2.0 * r.ln() / r).sqrt();
        }
    }
}

/// Maxwell-distributed velocities: every component ~ N(0, sqrt(T)).
pub fn maxwell_velocities<R: Rng + ?Sized>(
    config: &Configuration,
    temperature: f64,
    rng: &mut R,
) -> VectorField {
    let sigma = temperature.sqrt();
    let mut v = VectorField::zeros(config.n_particles());
    for c in v.as_mut_slice() {
        *c = gauss_distributed(0.0, sigma, rng);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn gaussian_moments() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 200_000;
        let samples: Vec<f64> = (0..n).map(|_| gauss_distributed(1.5, 2.0, &mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 1.5).abs() < 0.03, "mean = {}", mean);
        assert!((var.sqrt() - 2.0).abs() < 0.03, "std = {}", var.sqrt());
    }

    #[test]
    fn displacement_starts_from_origin_each_time() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let origin = Configuration::from_flat(vec![5.0, 5.0, 1.0, 1.0]).unwrap();
        let op = Displacement::new(0.2, Boundary::Hard, 10.0);
        for _ in 0..100 {
            let trial = op.apply(&origin, 0, &mut rng);
            let d = trial.position(0) - origin.position(0);
            assert!(d.x.abs() <= 0.1 && d.y.abs() <= 0.1);
            assert_eq!(trial.position(1), origin.position(1));
        }
    }

    #[test]
    fn displacement_stays_in_box() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let origin = Configuration::from_flat(vec![0.01, 9.99]).unwrap();
        for boundary in [Boundary::Hard, Boundary::Periodic] {
            let op = Displacement::new(1.0, boundary, 10.0);
            for _ in 0..500 {
                let p = op.apply(&origin, 0, &mut rng).position(0);
                assert!((0.0..10.0).contains(&p.x) && (0.0..10.0).contains(&p.y));
            }
        }
    }
}
