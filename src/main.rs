use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossbeam_channel::unbounded;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use lj2d::core::domain::{Boundary, Configuration, Method, Params};
use lj2d::engine::evaluator;
use lj2d::engine::operators::maxwell_velocities;
use lj2d::solvers::mc::MonteCarlo;
use lj2d::solvers::md::MolecularDynamics;
use lj2d::solvers::{SolverEvent, StepStats};

// --- CLI Definitions ---

#[derive(Parser, Debug)]
#[command(author, version, about = "2D Lennard-Jones sampler (Metropolis MC / Andersen MD)", long_about = None)]
struct Args {
    /// JSON parameter file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sampling method (mc, md)
    #[arg(short, long)]
    method: Option<String>,

    /// Boundary condition (hard, periodic)
    #[arg(short, long)]
    boundary: Option<String>,

    /// Number of MC moves or MD steps
    #[arg(short, long)]
    steps: Option<usize>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Reduced temperature
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Box side length L
    #[arg(short = 'L', long)]
    box_size: Option<f64>,

    /// Particle density N / L^2 of the initial configuration
    #[arg(short, long)]
    density: Option<f64>,

    /// Start from a square lattice instead of random placement
    #[arg(long, default_value_t = false)]
    lattice: bool,

    /// Write the reported statistics as CSV
    #[arg(long)]
    stats_csv: Option<PathBuf>,

    /// Write the final configuration as CSV (x,y per particle)
    #[arg(long)]
    output: Option<PathBuf>,
}

// --- Initialization Helpers ---

fn load_params(args: &Args) -> Result<Params> {
    let mut params = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read parameter file {}", path.display()))?;
            serde_json::from_str::<Params>(&text)
                .with_context(|| format!("Failed to parse parameter file {}", path.display()))?
        }
        None => Params::default(),
    };

    if let Some(m) = &args.method {
        params.method = match m.to_lowercase().as_str() {
            "mc" => Method::MonteCarlo,
            "md" => Method::MolecularDynamics,
            other => return Err(anyhow!("Unknown method '{}' (expected mc or md)", other)),
        };
    }
    if let Some(b) = &args.boundary {
        params.boundary = match b.to_lowercase().as_str() {
            "hard" => Boundary::Hard,
            "periodic" => Boundary::Periodic,
            other => return Err(anyhow!("Unknown boundary '{}' (expected hard or periodic)", other)),
        };
    }
    if let Some(v) = args.steps { params.steps = v; }
    if let Some(v) = args.seed { params.seed = v; }
    if let Some(v) = args.temperature { params.temperature = v; }
    if let Some(v) = args.box_size { params.box_length = v; }
    if let Some(v) = args.density { params.density = v; }

    params.validate().context("Invalid simulation parameters")?;
    Ok(params)
}

fn write_stats(path: &Path, stats: &[StepStats]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in stats {
        wtr.serialize(row).context("Failed to write statistics row")?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_configuration(path: &Path, config: &Configuration) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(["x", "y"])?;
    for p in config.positions() {
        wtr.write_record(&[p.x.to_string(), p.y.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

// --- Main ---

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let params = load_params(&args)?;
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    let start = if args.lattice {
        Configuration::square_lattice(params.density, params.box_length)
    } else {
        Configuration::random(
            params.density,
            params.box_length,
            params.placement_distance,
            &mut rng,
        )
        .context("Failed to generate initial configuration")?
    };
    info!(
        "Initial configuration: {} particles in L = {} ({:?} boundary)",
        start.n_particles(),
        params.box_length,
        params.boundary
    );

    // Evaluator is picked once for the whole run
    let evaluator = evaluator::select(&params);
    let (tx, rx) = unbounded();

    let final_config = match params.method {
        Method::MonteCarlo => {
            let solver = MonteCarlo::new(evaluator, params.clone())?;
            solver.solve(start, &mut rng, &tx)?
        }
        Method::MolecularDynamics => {
            let velocities = maxwell_velocities(&start, params.temperature, &mut rng);
            let solver = MolecularDynamics::new(evaluator, params.clone())?;
            let (config, _velocities) = solver.solve(start, velocities, &mut rng, &tx)?;
            config
        }
    };
    drop(tx);

    let mut stats = Vec::new();
    for event in rx {
        match event {
            SolverEvent::Log(msg) => println!("{}", msg),
            SolverEvent::StepUpdate(s) => {
                println!(
                    "step {:>8}  U = {:>12.5}  K = {:>10.5}  T = {:>8.4}  acc = {:.3}",
                    s.step, s.potential_energy, s.kinetic_energy, s.temperature, s.acceptance_ratio
                );
                stats.push(s);
            }
            SolverEvent::Finished => {}
        }
    }

    if let Some(path) = &args.stats_csv {
        write_stats(path, &stats)?;
        info!("Statistics written to {}", path.display());
    }
    if let Some(path) = &args.output {
        write_configuration(path, &final_config)?;
        info!("Final configuration written to {}", path.display());
    }

    Ok(())
}
