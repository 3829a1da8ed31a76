use crossbeam_channel::unbounded;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

use lj2d::analysis::rdf::radial_distribution;
use lj2d::core::domain::{Boundary, Configuration, Params};
use lj2d::engine::evaluator;
use lj2d::engine::operators::maxwell_velocities;
use lj2d::solvers::mc::MonteCarlo;
use lj2d::solvers::md::MolecularDynamics;
use lj2d::solvers::SolverEvent;

fn first_peak(config: &Configuration, params: &Params) -> f64 {
    let (g_r, r_list) = radial_distribution(config, params.box_length, params.density, 300)
        .expect("valid rdf arguments");
    let (k, _) = g_r
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |best, (k, &g)| if g > best.1 { (k, g) } else { best });
    r_list[k]
}

fn main() {
    let params = Params {
        boundary: Boundary::Periodic,
        box_length: 12.0,
        density: 0.4,
        temperature: 1.2,
        cutoff: Some(2.5),
        steps: 5000,
        report_every: 1000,
        ..Default::default()
    };
    params.validate().expect("demo parameters are valid");

    let start = Configuration::square_lattice(params.density, params.box_length);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    // Monte Carlo
    let (tx, rx) = unbounded();
    let mc = MonteCarlo::new(evaluator::select(&params), params.clone()).expect("mc setup");
    let t0 = Instant::now();
    let mc_end = mc.solve(start.clone(), &mut rng, &tx).expect("mc run");
    println!("MC took: {:?}", t0.elapsed());
    drop(tx);
    for msg in rx {
        if let SolverEvent::StepUpdate(s) = msg {
            println!("  MC step {:>6}  U = {:>10.4}  acc = {:.3}", s.step, s.potential_energy, s.acceptance_ratio);
        }
    }

    // Molecular Dynamics
    let (tx, rx) = unbounded();
    let md = MolecularDynamics::new(evaluator::select(&params), params.clone()).expect("md setup");
    let velocities = maxwell_velocities(&start, params.temperature, &mut rng);
    let t0 = Instant::now();
    let (md_end, _) = md.solve(start, velocities, &mut rng, &tx).expect("md run");
    println!("MD took: {:?}", t0.elapsed());
    drop(tx);
    for msg in rx {
        if let SolverEvent::StepUpdate(s) = msg {
            println!(
                "  MD step {:>6}  U = {:>10.4}  K = {:>9.4}  T = {:.3}",
                s.step, s.potential_energy, s.kinetic_energy, s.temperature
            );
        }
    }

    println!("g(r) first peak: MC {:.3}, MD {:.3}", first_peak(&mc_end, &params), first_peak(&md_end, &params));
}
