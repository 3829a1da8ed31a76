use std::f64::consts::PI;

use lj2d::analysis::rdf::radial_distribution;
use lj2d::core::domain::Configuration;
use lj2d::error::SimError;

fn counts(g_r: &[f64], r_list: &[f64], rho: f64) -> Vec<f64> {
    (0..r_list.len() - 1)
        .map(|k| g_r[k] * rho * PI * (r_list[k + 1].powi(2) - r_list[k].powi(2)))
        .collect()
}

#[test]
fn test_rdf_of_square_lattice() {
    let rho = 0.16;
    let c = Configuration::square_lattice(rho, 10.0);
    let (g_r, r_list) = radial_distribution(&c, 10.0, rho, 200).unwrap();

    assert_eq!(g_r.len(), 200);
    assert_eq!(r_list.len(), 200);
    assert_eq!(g_r[199], 0.0);
    assert!(r_list[0].abs() < 1e-12);
    assert!((r_list[199] - (2f64.sqrt() * 10.0 + 1.0)).abs() < 1e-9);

    let n = counts(&g_r, &r_list, rho);
    assert!((n.iter().sum::<f64>() - 15.0).abs() < 1e-9);

    // Four nearest neighbours at the lattice spacing
    let k = r_list.iter().position(|&r| r >= 2.5).unwrap() - 1;
    assert!((n[k] - 4.0).abs() < 1e-9);

    // Nothing closer than the spacing
    assert!(n[..k].iter().all(|&x| x == 0.0));
}

#[test]
fn test_rdf_folds_periodic_separations() {
    let c = Configuration::from_flat(vec![0.5, 0.5, 9.5, 0.5]).unwrap();
    let (g_r, r_list) = radial_distribution(&c, 10.0, 0.02, 101).unwrap();
    let n = counts(&g_r, &r_list, 0.02);
    let k = n.iter().position(|&x| x > 0.5).unwrap();
    assert!(r_list[k] < 1.0 && 1.0 <= r_list[k + 1]);
}

#[test]
fn test_rdf_single_particle_is_empty() {
    let c = Configuration::from_flat(vec![1.0, 1.0]).unwrap();
    let (g_r, _) = radial_distribution(&c, 10.0, 0.01, 10).unwrap();
    assert!(g_r.iter().all(|&g| g == 0.0));
}

#[test]
fn test_rdf_rejects_bad_arguments() {
    let c = Configuration::from_flat(vec![1.0, 1.0, 2.0, 2.0]).unwrap();
    assert!(matches!(
        radial_distribution(&c, 10.0, 0.02, 1),
        Err(SimError::InvalidParameter { name: "r_count", .. })
    ));
    assert!(matches!(
        radial_distribution(&c, 10.0, 0.0, 50),
        Err(SimError::InvalidParameter { name: "rho", .. })
    ));
}
