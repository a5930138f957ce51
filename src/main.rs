//! platformer-sim: headless replay runner
//!
//! Loads a level (and optionally a config and an input script), runs the
//! simulation for a number of ticks and reports where everything ended up.
//!
//!   platformer-sim --level levels/sandbox.ron --script scripts/walk_and_jump.ron
//!   platformer-sim --level levels/sandbox.ron --validate

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use platformer_core::input::{InputFrame, InputScript};
use platformer_core::level::load_level;
use platformer_core::{SimConfig, Simulation, VERSION};

const DEFAULT_DT: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "platformer-sim")]
#[command(about = "Run the platformer simulation headless")]
struct Cli {
    /// Level file (RON, plain or brotli-compressed)
    #[arg(long)]
    level: PathBuf,

    /// Tuning config (RON); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = DEFAULT_DT)]
    dt: f32,

    /// Seed for enemy wander noise
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Input script (RON); the player stands still without one
    #[arg(long)]
    script: Option<PathBuf>,

    /// Only load and validate the level and config, then exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    info!("platformer-sim v{}", VERSION);

    let config = match &cli.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let level = load_level(&cli.level).with_context(|| format!("loading level {}", cli.level.display()))?;

    if cli.validate {
        println!(
            "{}: ok ({} terrain pieces, {} enemies, {} coins)",
            cli.level.display(),
            level.terrain.len(),
            level.enemies.len(),
            level.coins.len()
        );
        return Ok(());
    }

    let frames = match &cli.script {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
            InputScript::from_ron_str(&text)
                .with_context(|| format!("parsing script {}", path.display()))?
                .expand()
        }
        None => Vec::new(),
    };

    let mut sim = Simulation::new(config, cli.seed);
    sim.load_level(&level).context("starting level")?;

    let idle = InputFrame::new();
    for frame in 0..cli.ticks {
        let input = usize::try_from(frame).ok().and_then(|i| frames.get(i)).unwrap_or(&idle);
        sim.frame(input, cli.dt).with_context(|| format!("tick {}", frame))?;

        for cue in sim.drain_sounds() {
            debug!("tick {}: sound {:?}", sim.context.tick, cue);
        }
        for respawn in sim.drain_respawns() {
            info!("tick {}: player respawned ({:?})", sim.context.tick, respawn.reason);
        }
    }

    report(&sim);
    Ok(())
}

fn report(sim: &Simulation) {
    println!("ticks: {}  time: {:.3}s", sim.context.tick, sim.context.time);

    if let Some(player) = sim.player() {
        let position = sim.world.position(player).unwrap_or_default();
        println!("player {} at ({:.3}, {:.3}, {:.3})", player, position.x, position.y, position.z);
        if let Some(controller) = sim.world.controllers.get(player) {
            println!(
                "  health {}/{}  coins {}  holding {}",
                controller.health,
                controller.max_health,
                controller.coins,
                controller.is_holding()
            );
        }
    }

    for (id, ai) in sim.world.enemies.iter() {
        let position = sim.world.position(id).unwrap_or_default();
        println!(
            "enemy {} {:?} at ({:.3}, {:.3}, {:.3})",
            id, ai.state, position.x, position.y, position.z
        );
    }
    println!("coins left: {}", sim.world.coins.count());
}
