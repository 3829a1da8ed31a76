use std::f64::consts::PI;

use crate::core::domain::Configuration;
use crate::error::{Result, SimError};

/// Radial distribution function g(r) seen from particle 0 of a periodic configuration.
///
/// Each axis separation is folded (`d > L/2 -> L - d`) before taking the distance.
/// Distances are binned on `r_count` evenly spaced points over `[0, sqrt(2) L + 1]`;
/// bin `k` covers `(r_k, r_{k+1}]` and is normalised by the ideal-gas count
/// `rho * pi (r_{k+1}^2 - r_k^2)`. The last entry of `g_r` is always zero.
///
/// Returns `(g_r, r_list)`.
pub fn radial_distribution(
    config: &Configuration,
    box_length: f64,
    rho: f64,
    r_count: usize,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if r_count < 2 {
        return Err(SimError::InvalidParameter {
            name: "r_count",
            value: r_count as f64,
            reason: "needs at least two sample points",
        });
    }
    if !(rho > 0.0) {
        return Err(SimError::InvalidParameter {
            name: "rho",
            value: rho,
            reason: "must be positive",
        });
    }

    let r_max = 2f64.sqrt() * box_length + 1.0;
    let step = r_max / (r_count - 1) as f64;
    let r_list: Vec<f64> = (0..r_count).map(|k| k as f64 * step).collect();
    let mut counts = vec![0.0; r_count];

    let n = config.n_particles();
    if n > 1 {
        let origin = config.position(0);
        for i in 1..n {
            let p = config.position(i);
            let r2: f64 = [p.x - origin.x, p.y - origin.y]
                .iter()
                .map(|d| {
                    let mut d = d.abs();
                    if d > box_length / 2.0 {
                        d = (box_length - d).abs();
                    }
                    d * d
                })
                .sum();
            let r = r2.sqrt();

            // First sample point at or beyond r closes the bin.
            let upper = r_list.partition_point(|&x| x < r).min(r_count - 1);
            counts[upper.saturating_sub(1)] += 1.0;
        }
    }

    let mut g_r = vec![0.0; r_count];
    for k in 0..r_count - 1 {
        let shell = PI * (r_list[k + 1].powi(2) - r_list[k].powi(2));
        g_r[k] = counts[k] / (shell * rho);
    }

    Ok((g_r, r_list))
}
