use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crowdnav_core::{ControlMode, ScenarioCatalog, Simulation, SimulationSettings};
use tracing::{info, warn};

/// Flags override the `CROWD_SIM_*` environment, which overrides the defaults.
#[derive(Parser, Debug)]
#[command(
    name = "crowdnav",
    version,
    about = "Run robot crowd-navigation episodes headless and report penalties"
)]
struct Cli {
    /// Scenario id to load (file stem under the config directory).
    #[arg(long)]
    scenario: Option<String>,

    /// Number of pedestrians in the crowd.
    #[arg(long)]
    pedestrians: Option<usize>,

    /// Deterministic random seed.
    #[arg(long, conflicts_with = "random_seed")]
    seed: Option<u64>,

    /// Draw the seed from OS entropy.
    #[arg(long)]
    random_seed: bool,

    /// Jitter template obstacles and add extra ones each episode.
    #[arg(long)]
    random_world: bool,

    /// Directory holding `<id>.json` scenario templates.
    #[arg(long)]
    scenario_config_dir: Option<PathBuf>,

    /// Robot strategy: naive, random or potential-field.
    #[arg(long)]
    mode: Option<ControlMode>,

    /// Stop after this many finished episodes.
    #[arg(long, default_value_t = 10)]
    episodes: usize,

    /// Hard cap on simulated ticks.
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Print every episode summary as a JSON line on stdout.
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn settings_from(cli: &Cli) -> Result<SimulationSettings> {
    let mut settings =
        SimulationSettings::from_env().context("invalid CROWD_SIM_* environment")?;
    if let Some(id) = &cli.scenario {
        settings.scenario_id = id.clone();
    }
    if let Some(count) = cli.pedestrians {
        settings.pedestrian_count = count;
    }
    if let Some(seed) = cli.seed {
        settings.seed = Some(seed);
        settings.random_seed = false;
    }
    if cli.random_seed {
        settings.random_seed = true;
    }
    if cli.random_world {
        settings.randomize_world = true;
    }
    if let Some(dir) = &cli.scenario_config_dir {
        settings.scenario_dir = dir.clone();
    }
    if let Some(mode) = cli.mode {
        settings.mode = mode;
    }
    Ok(settings)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = settings_from(&cli)?;

    if !settings.mode.is_autonomous() {
        bail!("manual mode needs an interactive front-end; pick naive, random or potential-field");
    }

    let catalog = ScenarioCatalog::load(&settings.scenario_dir).with_context(|| {
        format!(
            "failed to load scenarios from {}",
            settings.scenario_dir.display()
        )
    })?;
    let mut sim = Simulation::new(catalog, settings).context("failed to start simulation")?;

    let summaries = sim.run_until(cli.max_ticks, cli.episodes);
    if cli.json {
        for summary in &summaries {
            println!(
                "{}",
                serde_json::to_string(summary).context("failed to encode summary")?
            );
        }
    }

    if summaries.len() < cli.episodes {
        warn!(
            finished = summaries.len(),
            requested = cli.episodes,
            max_ticks = cli.max_ticks,
            "Tick budget exhausted before all episodes finished"
        );
    }

    let stats = sim.stats();
    info!(
        scenario = %sim.scenario().id,
        seed = sim.seed(),
        episodes = stats.completed_episodes(),
        avg_penalty = format_args!("{:.2}", stats.average_penalty().unwrap_or(0.0)),
        avg_steps = format_args!("{:.1}", stats.average_steps().unwrap_or(0.0)),
        "Run finished"
    );

    Ok(())
}
