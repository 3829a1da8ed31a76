use nalgebra::{Point2, Vector2};

use crate::core::domain::{Boundary, Configuration};

/// Folds one axis displacement into `[-L/2, L/2]` (minimum image).
#[inline]
pub fn minimum_image(d: f64, box_length: f64) -> f64 {
    d - box_length * (d / box_length).round()
}

/// Displacement `p2 - p1` under the given boundary.
/// Periodic applies the Minimum Image Convention per axis; Hard uses the raw difference.
#[inline]
pub fn displacement(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    boundary: Boundary,
    box_length: f64,
) -> Vector2<f64> {
    let d = p2 - p1;
    match boundary {
        Boundary::Hard => d,
        Boundary::Periodic => Vector2::new(
            minimum_image(d.x, box_length),
            minimum_image(d.y, box_length),
        ),
    }
}

#[inline]
pub fn distance_sq(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    boundary: Boundary,
    box_length: f64,
) -> f64 {
    displacement(p1, p2, boundary, box_length).norm_squared()
}

#[inline]
pub fn in_range(x: f64, box_length: f64) -> bool {
    (0.0..box_length).contains(&x)
}

/// `x mod L` in `[0, L)`. `rem_euclid` can round up to exactly `L` for tiny negative inputs.
#[inline]
fn wrap(x: f64, box_length: f64) -> f64 {
    let r = x.rem_euclid(box_length);
    if r >= box_length {
        0.0
    } else {
        r
    }
}

/// Brings a coordinate that left the box back into `[0, L)`.
///
/// Periodic wraps (`L + e -> e`, `L -> 0`). Hard reflects off the wall it
/// crossed via `L - (x mod L)`, so `L + e -> L - e` and `-e -> e`.
/// Exact multiples of `L` fold to `0` in both modes.
#[inline]
pub fn fold_coordinate(x: f64, boundary: Boundary, box_length: f64) -> f64 {
    if in_range(x, box_length) {
        return x;
    }
    match boundary {
        Boundary::Periodic => wrap(x, box_length),
        Boundary::Hard => wrap(box_length - wrap(x, box_length), box_length),
    }
}

#[inline]
pub fn fold_point(p: Point2<f64>, boundary: Boundary, box_length: f64) -> Point2<f64> {
    Point2::new(
        fold_coordinate(p.x, boundary, box_length),
        fold_coordinate(p.y, boundary, box_length),
    )
}

/// Overlap Detector on raw Euclidean distances.
/// Returns `true` as soon as any pair sits closer than `sigma`.
pub fn overlap(config: &Configuration, sigma: f64) -> bool {
    check_overlap(config, sigma, Boundary::Hard, 0.0)
}

/// Scans all unordered pairs and exits on the first pair with `r^2 < sigma^2`.
/// `box_length` is only read under periodic boundaries.
pub fn check_overlap(
    config: &Configuration,
    sigma: f64,
    boundary: Boundary,
    box_length: f64,
) -> bool {
    let n = config.n_particles();
    if n <= 1 {
        return false;
    }
    let threshold_sq = sigma * sigma;

    for i in 0..n {
        let p_i = config.position(i);
        for j in (i + 1)..n {
            let p_j = config.position(j);
            if distance_sq(&p_i, &p_j, boundary, box_length) < threshold_sq {
                return true; // Collision detected
            }
        }
    }
    false
}

/// Whether particle `k` overlaps any other particle. O(N) instead of O(N^2),
/// sufficient after a single-particle move from an overlap-free state.
pub fn particle_overlaps(
    config: &Configuration,
    k: usize,
    sigma: f64,
    boundary: Boundary,
    box_length: f64,
) -> bool {
    let threshold_sq = sigma * sigma;
    let p_k = config.position(k);

    (0..config.n_particles())
        .filter(|&j| j != k)
        .any(|j| distance_sq(&p_k, &config.position(j), boundary, box_length) < threshold_sq)
}
