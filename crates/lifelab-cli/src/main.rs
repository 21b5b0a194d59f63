//! Command-line driver for the critter simulator.

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use lifelab_core::{RunSummary, SimConfig};
use lifelab_world::{
    FixedRatePacer, Frontend, Pacer, Renderer, Sprite, StillBackdrop, Unpaced, World,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, trace};

#[derive(Parser, Debug)]
#[command(name = "lifelab", version, about = "Artificial-life critter simulator")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many steps
    #[arg(long)]
    steps: Option<u64>,

    /// Number of critters seeded at startup
    #[arg(long)]
    initial: Option<usize>,

    /// Population limit for births
    #[arg(long)]
    limit: Option<usize>,

    /// Steps per second, 0 runs unpaced
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn into_config(self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => SimConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(steps) = self.steps {
            config.max_steps = Some(steps);
        }
        if let Some(initial) = self.initial {
            config.population.initial_count = initial;
        }
        if let Some(limit) = self.limit {
            config.population.limit = limit;
        }
        if let Some(rate) = self.tick_rate {
            config.population.tick_rate = rate;
        }

        Ok(config)
    }
}

/// Counts what each frame would draw; a stand-in for a graphical surface
#[derive(Debug, Default)]
struct TallyRenderer {
    frame: u64,
    alive: usize,
    dead: usize,
}

impl Renderer for TallyRenderer {
    fn begin_frame(&mut self) {
        self.frame += 1;
        self.alive = 0;
        self.dead = 0;
    }

    fn draw(&mut self, sprite: &Sprite) {
        if sprite.alive {
            self.alive += 1;
        } else {
            self.dead += 1;
        }
    }

    fn end_frame(&mut self) {
        trace!(frame = self.frame, alive = self.alive, dead = self.dead, "Frame drawn");
    }
}

fn simulate<P: Pacer>(mut world: World, pacer: P) -> RunSummary {
    let mut frontend = Frontend::new(pacer, StillBackdrop, TallyRenderer::default());
    world.seed_population();
    world.run(&mut frontend)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_logging(args.json_logs)?;

    let config = args.into_config()?;
    info!(
        seed = config.seed,
        max_steps = ?config.max_steps,
        tick_rate = config.population.tick_rate,
        "Starting Lifelab"
    );

    let world = World::new(config.clone()).context("invalid simulation config")?;

    let quit = Arc::new(AtomicBool::new(false));
    let signal_quit = quit.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_quit.store(true, Ordering::Relaxed);
    });

    let tick_rate = config.population.tick_rate;
    let summary = tokio::task::spawn_blocking(move || {
        if tick_rate == 0 {
            simulate(world, Unpaced::with_quit_flag(quit))
        } else {
            simulate(world, FixedRatePacer::new(quit))
        }
    })
    .await
    .map_err(|e| {
        error!("Simulation task failed: {}", e);
        e
    })?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
