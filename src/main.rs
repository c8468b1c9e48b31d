use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use physproc::config::SimulationConfig;
use physproc::recorder::{RunSummary, Trajectory};
use physproc::scale::meters_to_au;
use physproc::sensitivity::{perturb_active, SensitivityRun};
use physproc::sweep::decay_sweep;
use physproc::{FrameModel, Group, InitialCondition, Pendulum, Planet, SolarSystem};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "physproc", about = "Headless runner for the pendulum and solar-system models")]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Swing the pendulum for a number of frames
    Pendulum {
        #[arg(short, long)]
        frames: Option<usize>,
        /// Release angle in whole degrees, 0 to 90
        #[arg(short, long)]
        angle: Option<i64>,
    },
    /// Integrate the solar system and export trajectories
    Solar {
        #[arg(short, long)]
        frames: Option<usize>,
        #[arg(short, long)]
        group: Option<Group>,
        /// Planets to enable, e.g. `--enable earth --enable mars`
        #[arg(short, long)]
        enable: Vec<Planet>,
    },
    /// Pendulum decay over release angles
    Sweep {
        #[arg(short, long, default_value_t = 5000)]
        frames: usize,
    },
    /// Divergence of a perturbed solar system from the reference run
    Sensitivity {
        #[arg(short, long, default_value_t = 3650)]
        frames: usize,
        /// Position jitter in metres
        #[arg(short, long, default_value_t = 1.0e6)]
        perturbation: f64,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(SimulationConfig::default()),
    }
}

fn solar_system(config: &SimulationConfig, group: Group, enabled: &[Planet]) -> Result<SolarSystem> {
    let mut system = SolarSystem::new()?.with_min_separation(config.solar.min_separation)?;
    system.activate_group(group)?;
    for planet in enabled {
        system.set_enabled(*planet, true)?;
    }
    Ok(system)
}

fn run_pendulum(config: &SimulationConfig, frames: Option<usize>, angle: Option<i64>) -> Result<()> {
    let mut params = config.pendulum;
    if let Some(degrees) = angle {
        params.initial = InitialCondition::from_degrees(degrees);
    }
    let frames = frames.unwrap_or(config.run.frames);
    let mut pendulum = Pendulum::new(params, config.surface.width)?;
    info!(?params, frames, "starting pendulum run");

    let mut trajectory = Trajectory::new(frames);
    for frame in 0..frames {
        pendulum.advance()?;
        if frame % config.run.record_every == 0 {
            trajectory.record_pendulum(frame, &pendulum);
        }
    }

    std::fs::create_dir_all(&config.run.output_dir)?;
    trajectory.export_pendulum_csv(config.run.output_dir.join("pendulum_positions.csv"))?;
    let state = pendulum.state();
    info!(
        angle = state.angle,
        angular_velocity = state.angular_velocity,
        bob = ?state.bob_position,
        "pendulum run complete"
    );
    Ok(())
}

fn run_solar(config: &SimulationConfig, frames: Option<usize>, group: Option<Group>, enable: Vec<Planet>) -> Result<()> {
    let group = group.unwrap_or(config.solar.group);
    let enabled = if enable.is_empty() {
        config.solar.planets()?
    } else {
        enable
    };
    let frames = frames.unwrap_or(config.run.frames);
    let mut system = solar_system(config, group, &enabled)?;
    info!(?group, ?enabled, frames, "starting solar-system run");

    let start = Instant::now();
    let pb = ProgressBar::new(frames as u64);
    pb.set_message(format!("Integrating {}", system.name()));
    let mut trajectory = Trajectory::new(frames);
    for frame in 0..frames {
        if let Err(e) = system.advance() {
            warn!(frame, error = %e, "step failed, stopping run");
            pb.abandon();
            return Err(e.into());
        }
        if frame % config.run.record_every == 0 {
            trajectory.record_nbody(frame, &system.model);
        }
        pb.inc(1);
    }
    pb.finish();
    let elapsed = start.elapsed().as_secs_f64();

    for (_, body) in system.model.active_bodies() {
        info!(
            body = %body.name,
            distance_au = meters_to_au(body.distance_to_reference),
            "{}",
            body
        );
    }

    std::fs::create_dir_all(&config.run.output_dir)?;
    trajectory.export_bodies_csv(config.run.output_dir.join("solar_positions.csv"))?;
    let names = system
        .model
        .active_bodies()
        .map(|(_, b)| b.name.clone())
        .collect();
    RunSummary::new(&system.name(), &trajectory, names, elapsed)
        .with_notes(&format!("{group:?} group"))
        .write_json(config.run.output_dir.join("solar_summary.json"))?;
    info!(elapsed, "solar-system run complete");
    Ok(())
}

fn run_sweep(config: &SimulationConfig, frames: usize) -> Result<()> {
    let degrees: Vec<i64> = (0..=90).step_by(5).collect();
    let results = decay_sweep(config.pendulum, config.surface.width, &degrees, frames)?;
    for r in &results {
        info!(
            degrees = r.degrees,
            first = r.first_angular_velocity,
            last = r.final_angular_velocity,
            settle_frame = ?r.settle_frame,
            "decay"
        );
    }
    Ok(())
}

fn run_sensitivity(config: &SimulationConfig, frames: usize, perturbation: f64) -> Result<()> {
    let enabled = config.solar.planets()?;
    let reference = solar_system(config, config.solar.group, &enabled)?.model;
    let mut perturbed = reference.clone();
    perturb_active(&mut perturbed, perturbation, 0.0, &mut rand::rng())?;

    let mut run = SensitivityRun::new(reference, perturbed)?;
    run.run(frames)?;
    info!(
        initial = run.separations.first().copied().unwrap_or_default(),
        last = run.separations.last().copied().unwrap_or_default(),
        rate = run.divergence_rate()?,
        "sensitivity run complete"
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_ansi(true)
        .with_file(true)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Pendulum { frames, angle } => run_pendulum(&config, frames, angle),
        Command::Solar { frames, group, enable } => run_solar(&config, frames, group, enable),
        Command::Sweep { frames } => run_sweep(&config, frames),
        Command::Sensitivity { frames, perturbation } => run_sensitivity(&config, frames, perturbation),
    }
}
