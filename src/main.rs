use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, warn};

use smart_signal::publisher::SnapshotPublisher;
use smart_signal::simulation::{EventLog, ManualClock, SimConfig, SimWorld, Snapshot, SnapshotCell};

/// Snapshot polling interval when the simulation runs on virtual time
const FAST_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Parser)]
#[command(name = "smart_signal")]
#[command(about = "Adaptive traffic signal simulation with emergency vehicle priority")]
struct Cli {
    /// JSON configuration file; unspecified fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of signal cycles to run
    #[arg(long)]
    cycles: Option<u32>,

    /// Seed for reproducible traffic
    #[arg(long)]
    seed: Option<u64>,

    /// Where the latest snapshot is written for the visualizer
    #[arg(long, default_value = "traffic_data.json")]
    snapshot: PathBuf,

    /// Event log file, truncated at startup
    #[arg(long, default_value = "traffic_log.txt")]
    log_file: PathBuf,

    /// Do not write the event log to a file
    #[arg(long)]
    no_log_file: bool,

    /// Run on virtual time instead of sleeping between ticks
    #[arg(long)]
    fast: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,smart_signal=info"),
    )
    .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(cycles) = cli.cycles {
        config.max_cycles = cycles;
    }
    config.validate().context("Invalid configuration")?;

    let events = if cli.no_log_file {
        EventLog::new()
    } else {
        EventLog::new().with_file(&cli.log_file)?
    };

    let cell = Arc::new(SnapshotCell::new(Snapshot::initial(config.max_cycles)));
    let poll_interval = if cli.fast {
        FAST_POLL_INTERVAL
    } else {
        config.tick()
    };

    println!("Running adaptive signal simulation...");
    println!(
        "Cycles: {}, tick: {}ms, snapshot: {}",
        config.max_cycles,
        config.tick_ms,
        cli.snapshot.display()
    );
    println!();

    let world = match (cli.fast, cli.seed) {
        (true, seed) => SimWorld::with_clock(
            config,
            ManualClock::new(),
            seed.unwrap_or_else(rand::random),
        ),
        (false, Some(seed)) => SimWorld::new_with_seed(config, seed),
        (false, None) => SimWorld::new(config),
    };
    let mut world = world
        .with_event_log(events)
        .with_snapshot_cell(Arc::clone(&cell));

    let simulation = std::thread::Builder::new()
        .name("simulation".to_string())
        .spawn(move || {
            let report = world.run();
            (report, world.summary())
        })
        .context("Failed to start simulation thread")?;

    let mut publisher = SnapshotPublisher::new(cell, &cli.snapshot);
    publisher.run_until(|| simulation.is_finished(), poll_interval);

    let (report, summary) = simulation
        .join()
        .map_err(|_| anyhow!("Simulation thread panicked"))?;

    println!("{summary}");
    println!();

    if let Some(error) = &report.error {
        warn!("Simulation stopped early: {error}");
    }
    info!("=== SIMULATION COMPLETE ===");
    info!("Cycles completed: {}", report.cycles_completed);
    info!("Total vehicles passed: {}", report.vehicles_passed);
    info!("Snapshots written: {}", publisher.writes);

    Ok(())
}
