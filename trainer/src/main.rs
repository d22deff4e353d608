use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use game_core::{Config, ControllerRegistry, Simulation};
use tracing_subscriber::EnvFilter;
use trainer::{ControllerChoice, SaveStore, Settings, SystemEnv, TrainingOptions, TrainingSession};

#[derive(Parser, Debug)]
#[command(name = "trainer", version, about = "Train paddle controllers headlessly")]
struct Cli {
    /// Ticks to simulate
    #[arg(long, default_value_t = 100_000)]
    ticks: u64,
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    #[arg(long, value_enum, default_value_t = ControllerChoice::Learning)]
    left: ControllerChoice,
    #[arg(long, value_enum, default_value_t = ControllerChoice::Learning)]
    right: ControllerChoice,
    #[arg(long, default_value = "saves")]
    save_dir: PathBuf,
    /// Continue from the latest save instead of starting over
    #[arg(long, default_value_t = false)]
    resume: bool,
    /// JSON settings file (ball_speed, paddle_speed, width, height)
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long, default_value_t = 1_000)]
    self_play_interval: u64,
    #[arg(long, default_value_t = 300)]
    autosave_secs: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.settings {
        Some(path) => Settings::load(path)?.apply(Config::new()),
        None => Config::new(),
    };
    let options = TrainingOptions {
        self_play_interval: cli.self_play_interval,
        autosave_interval_ms: cli.autosave_secs.saturating_mul(1_000),
        ..TrainingOptions::default()
    };
    let store = SaveStore::open(&cli.save_dir)
        .with_context(|| format!("cannot use save directory {}", cli.save_dir.display()))?;

    let resumed = if cli.resume {
        TrainingSession::resume(
            store.clone(),
            &ControllerRegistry::with_builtins(),
            Box::new(SystemEnv::new()),
            options,
        )
        .context("failed to resume from latest save")?
    } else {
        None
    };

    let mut session = match resumed {
        Some(mut session) => {
            if cli.settings.is_some() {
                session.apply_config(config)?;
            }
            session
        }
        None => {
            if cli.resume {
                tracing::info!("no saves found, starting a new session");
            }
            let sim = Simulation::new(
                config,
                cli.seed,
                cli.left.build(cli.seed.wrapping_add(1)),
                cli.right.build(cli.seed.wrapping_add(2)),
            )
            .context("invalid configuration")?;
            TrainingSession::new(sim, store, Box::new(SystemEnv::new()), options)?
        }
    };

    session.run(cli.ticks)?;
    let path = session.save()?;
    tracing::info!(path = %path.display(), "final save written");

    println!("{}", session.summary());
    Ok(())
}
