use nalgebra::{Point2, Vector2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::spatial;
use crate::error::{Result, SimError};

// --- Constants ---

/// Spatial dimension of every buffer. The flat layout is x0, y0, x1, y1, ...
pub const DIM: usize = 2;

/// Placement attempts per particle before random packing gives up.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

fn particle_count(len: usize) -> Result<usize> {
    if len % DIM != 0 {
        return Err(SimError::OddLength(len));
    }
    Ok(len / DIM)
}

// --- Particle Buffers ---

/// Particle positions, stored as a flat interleaved buffer of length `2N`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Configuration {
    coords: Vec<f64>,
}

impl Configuration {
    pub fn from_flat(coords: Vec<f64>) -> Result<Self> {
        particle_count(coords.len())?;
        Ok(Self { coords })
    }

    pub fn from_points(points: &[Point2<f64>]) -> Self {
        let mut coords = Vec::with_capacity(points.len() * DIM);
        for p in points {
            coords.push(p.x);
            coords.push(p.y);
        }
        Self { coords }
    }

    pub fn n_particles(&self) -> usize {
        self.coords.len() / DIM
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.coords
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.coords
    }

    /// Position of particle `i`. Panics when `i` is out of range, like slice indexing.
    #[inline]
    pub fn position(&self, i: usize) -> Point2<f64> {
        Point2::new(self.coords[DIM * i], self.coords[DIM * i + 1])
    }

    #[inline]
    pub fn set_position(&mut self, i: usize, p: Point2<f64>) {
        self.coords[DIM * i] = p.x;
        self.coords[DIM * i + 1] = p.y;
    }

    pub fn positions(&self) -> impl Iterator<Item = Point2<f64>> + '_ {
        self.coords.chunks_exact(DIM).map(|c| Point2::new(c[0], c[1]))
    }

    pub fn check_index(&self, index: usize) -> Result<()> {
        let count = self.n_particles();
        if index >= count {
            return Err(SimError::ParticleIndex { index, count });
        }
        Ok(())
    }

    /// Random sequential placement of `floor(rho * L^2)` particles in `[0, L)^2`.
    ///
    /// Each particle is redrawn until it sits at least `min_distance` away from
    /// every particle already placed.
    pub fn random<R: Rng + ?Sized>(
        rho: f64,
        box_length: f64,
        min_distance: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let requested = (box_length * box_length * rho) as usize;
        let mut points: Vec<Point2<f64>> = Vec::with_capacity(requested);
        let limit_sq = min_distance * min_distance;

        for placed in 0..requested {
            let mut ok = false;
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                let candidate = Point2::new(
                    rng.gen::<f64>() * box_length,
                    rng.gen::<f64>() * box_length,
                );
                let clash = points
                    .iter()
                    .any(|p| nalgebra::distance_squared(p, &candidate) < limit_sq);
                if !clash {
                    points.push(candidate);
                    ok = true;
                    break;
                }
            }
            if !ok {
                return Err(SimError::PackingFailed { placed, requested });
            }
        }

        Ok(Self::from_points(&points))
    }

    /// Square lattice with `floor(rho * L^2)` particles.
    ///
    /// Columns hold `ceil(sqrt(N))` particles spaced `L / ceil(sqrt(N))` apart, so every
    /// site stays inside `[0, L)` and no site touches a periodic image of another.
    pub fn square_lattice(rho: f64, box_length: f64) -> Self {
        let n = (box_length * box_length * rho) as usize;
        if n == 0 {
            return Self { coords: Vec::new() };
        }
        let width = (n as f64).sqrt().ceil() as usize;
        let spacing = box_length / width as f64;

        let points: Vec<Point2<f64>> = (0..n)
            .map(|p| {
                Point2::new(
                    (p / width) as f64 * spacing,
                    (p % width) as f64 * spacing,
                )
            })
            .collect();
        Self::from_points(&points)
    }
}

impl TryFrom<Vec<f64>> for Configuration {
    type Error = SimError;

    fn try_from(coords: Vec<f64>) -> Result<Self> {
        Self::from_flat(coords)
    }
}

impl From<Configuration> for Vec<f64> {
    fn from(c: Configuration) -> Self {
        c.coords
    }
}

/// Per-particle vector quantity (velocity or force), same layout as [`Configuration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct VectorField {
    components: Vec<f64>,
}

impl VectorField {
    pub fn from_flat(components: Vec<f64>) -> Result<Self> {
        particle_count(components.len())?;
        Ok(Self { components })
    }

    pub fn zeros(n_particles: usize) -> Self {
        Self {
            components: vec![0.0; n_particles * DIM],
        }
    }

    pub fn n_particles(&self) -> usize {
        self.components.len() / DIM
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.components
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.components
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.components
    }

    #[inline]
    pub fn get(&self, i: usize) -> Vector2<f64> {
        Vector2::new(self.components[DIM * i], self.components[DIM * i + 1])
    }

    #[inline]
    pub fn add_to(&mut self, i: usize, v: Vector2<f64>) {
        self.components[DIM * i] += v.x;
        self.components[DIM * i + 1] += v.y;
    }

    /// Rejects buffers whose length differs from the configuration's.
    pub fn check_shape(&self, config: &Configuration) -> Result<()> {
        let expected = config.as_slice().len();
        let found = self.components.len();
        if expected != found {
            return Err(SimError::DimensionMismatch { expected, found });
        }
        Ok(())
    }

    /// `0.5 * sum(v^2)` for unit masses.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.components.iter().map(|v| v * v).sum::<f64>()
    }

    /// Instantaneous temperature (k_B = 1, unit masses): `2 KE / (2N)`.
    pub fn temperature(&self) -> f64 {
        if self.components.is_empty() {
            return 0.0;
        }
        2.0 * self.kinetic_energy() / self.components.len() as f64
    }
}

impl TryFrom<Vec<f64>> for VectorField {
    type Error = SimError;

    fn try_from(components: Vec<f64>) -> Result<Self> {
        Self::from_flat(components)
    }
}

impl From<VectorField> for Vec<f64> {
    fn from(f: VectorField) -> Self {
        f.components
    }
}

// --- Configuration Types ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    MonteCarlo,
    MolecularDynamics,
}

/// Box walls. Selected once per run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Reflecting walls at 0 and L; raw displacements.
    Hard,
    /// Wrap-around box; minimum-image displacements.
    Periodic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub method: Method,
    pub boundary: Boundary,
    pub seed: u64,

    // Box & Potential
    pub box_length: f64,
    pub sigma: f64,
    pub epsilon: f64,
    pub cutoff: Option<f64>, // Periodic force/energy truncation radius

    // Ensemble
    pub temperature: f64,

    // MC Specific
    pub delta: f64,
    pub max_proposals: usize,

    // MD Specific
    pub dt: f64,
    pub nu: f64,
    pub shrink_factor: f64,
    pub max_shrinks: usize,

    // Run Control
    pub steps: usize,
    pub report_every: usize,

    // Initial State
    pub density: f64,
    pub placement_distance: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            method: Method::MonteCarlo,
            boundary: Boundary::Hard,
            seed: 0,
            box_length: 10.0,
            sigma: 1.0,
            epsilon: 1.0,
            cutoff: None,
            temperature: 1.0,
            delta: 0.1,
            max_proposals: 10_000,
            dt: 0.001,
            nu: 1.0,
            shrink_factor: 1000.0,
            max_shrinks: 5,
            steps: 1000,
            report_every: 100,
            density: 0.3,
            placement_distance: 0.5,
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<()> {
    // `!(x > 0)` also rejects NaN
    if !(value > 0.0) || value.is_infinite() {
        return Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be a finite positive number",
        });
    }
    Ok(())
}

fn require_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !(value >= 0.0) || value.is_infinite() {
        return Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be a finite non-negative number",
        });
    }
    Ok(())
}

impl Params {
    /// Fails fast on values that would otherwise turn into NaN/Inf mid-run.
    pub fn validate(&self) -> Result<()> {
        require_positive("temperature", self.temperature)?;
        require_positive("box_length", self.box_length)?;
        require_positive("sigma", self.sigma)?;
        require_positive("epsilon", self.epsilon)?;
        require_non_negative("dt", self.dt)?;
        require_non_negative("delta", self.delta)?;
        require_non_negative("nu", self.nu)?;
        require_non_negative("density", self.density)?;
        require_non_negative("placement_distance", self.placement_distance)?;
        if let Some(rc) = self.cutoff {
            require_positive("cutoff", rc)?;
        }
        if !(self.shrink_factor > 1.0) {
            return Err(SimError::InvalidParameter {
                name: "shrink_factor",
                value: self.shrink_factor,
                reason: "must be greater than 1",
            });
        }
        Ok(())
    }

    /// `1 / T`, valid once [`Params::validate`] has passed.
    pub fn beta(&self) -> f64 {
        1.0 / self.temperature
    }
}

/// Checks that every position lies inside `[0, L)` on both axes.
pub fn inside_box(config: &Configuration, box_length: f64) -> bool {
    config
        .as_slice()
        .iter()
        .all(|&x| spatial::in_range(x, box_length))
}
