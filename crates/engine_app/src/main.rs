//! # engine_app: QuickStart
//!
//! A small scripted game exercising state-driven entities end to end.
//!
//! ## Run Sequence
//!
//! 1. Load the JSON config (optional) and apply command line overrides.
//! 2. Build the game coordinator in the Title state.
//! 3. Run the fixed-timestep loop, letting the scripted driver play.
//! 4. Log a summary and shut the coordinator down.

mod components;
mod config;
mod script;
mod states;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine_scene::TickLoop;

use config::AppConfig;
use script::ScriptedDriver;

#[derive(Parser)]
#[command(name = "engine_app", about = "QuickStart demo of state-driven entity components")]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ticks per second (overrides the config file)
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Stop after this many ticks, 0 runs the whole script (overrides the config file)
    #[arg(long)]
    max_ticks: Option<u64>,
}

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?.with_overrides(args.tick_rate, args.max_ticks);
    config.validate()?;

    info!(
        tick_rate = config.tick.tick_rate,
        max_ticks = config.tick.max_ticks,
        stop_at = config.script.stop_at,
        "quickstart starting"
    );

    let coordinator = states::build_coordinator(config.spawn_interval)?;
    let mut tick_loop = TickLoop::new(config.tick.clone(), coordinator);
    let mut driver = ScriptedDriver::new(config.script.clone());

    let ticks = tick_loop.run_with(|tick, game| driver.on_tick(tick, game));

    let game = tick_loop.into_coordinator();
    let summary = driver.summary(ticks, &game);
    info!(
        ticks = summary.ticks,
        state = ?summary.final_state,
        transitions = summary.transitions,
        rejected = summary.rejected,
        scenes = summary.scenes_loaded,
        nodes_spawned = summary.nodes_spawned,
        play_seconds = summary.play_seconds,
        ship_travel = summary.ship_travel,
        "quickstart finished"
    );

    let shared = game.shutdown();
    info!(entity = %shared.id(), "engine shut down");
    Ok(())
}
