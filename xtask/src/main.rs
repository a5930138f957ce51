//! Build automation tasks for the platformer simulation core
//!
//! Usage:
//!   cargo xtask ci                    # fmt check, clippy, tests
//!   cargo xtask check-levels          # validate every level under levels/
//!   cargo xtask replay <level> <script>

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for the platformer simulation core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run formatting check, clippy and the test suite
    Ci,
    /// Load and validate every level file in a directory
    CheckLevels {
        /// Directory to scan (relative to the project root)
        #[arg(long, default_value = "levels")]
        dir: PathBuf,
    },
    /// Replay an input script against a level in release mode
    Replay {
        level: PathBuf,
        script: PathBuf,
        /// Frames to run
        #[arg(long, default_value_t = 600)]
        ticks: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => ci(),
        Commands::CheckLevels { dir } => check_levels(&dir),
        Commands::Replay { level, script, ticks } => replay(&level, &script, ticks),
    }
}

/// Get the project root directory
fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask manifest has no parent directory")
}

/// Run a command and check for success
fn run_cmd(cmd: &mut Command) -> Result<()> {
    let status = cmd.status().context("Failed to execute command")?;
    if !status.success() {
        anyhow::bail!("Command failed with status: {}", status);
    }
    Ok(())
}

fn cargo(root: &Path) -> Command {
    let mut cmd = Command::new(std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string()));
    cmd.current_dir(root);
    cmd
}

fn ci() -> Result<()> {
    let root = project_root()?;

    println!("=== cargo fmt --check ===");
    run_cmd(cargo(&root).args(["fmt", "--all", "--", "--check"]))?;

    println!("=== cargo clippy ===");
    run_cmd(cargo(&root).args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]))?;

    println!("=== cargo test ===");
    run_cmd(cargo(&root).args(["test", "--workspace"]))?;

    println!("\nAll checks passed");
    Ok(())
}

fn check_levels(dir: &Path) -> Result<()> {
    let root = project_root()?;
    let levels_dir = root.join(dir);

    let mut levels: Vec<PathBuf> = std::fs::read_dir(&levels_dir)
        .with_context(|| format!("Failed to read {}", levels_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    levels.sort();

    if levels.is_empty() {
        anyhow::bail!("No level files found in {}", levels_dir.display());
    }

    println!("Building platformer-sim...");
    run_cmd(cargo(&root).args(["build", "--bin", "platformer-sim"]))?;
    let sim = root.join("target").join("debug").join(format!("platformer-sim{}", std::env::consts::EXE_SUFFIX));

    let mut failed = Vec::new();
    for level in &levels {
        let result = run_cmd(Command::new(&sim).arg("--validate").arg("--level").arg(level));
        if let Err(e) = result {
            eprintln!("  {}: {}", level.display(), e);
            failed.push(level);
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("{} of {} levels failed validation", failed.len(), levels.len());
    }
    println!("\n{} levels OK", levels.len());
    Ok(())
}

fn replay(level: &Path, script: &Path, ticks: u64) -> Result<()> {
    let root = project_root()?;
    run_cmd(
        cargo(&root)
            .args(["run", "--release", "--bin", "platformer-sim", "--"])
            .arg("--level")
            .arg(level)
            .arg("--script")
            .arg(script)
            .arg("--ticks")
            .arg(ticks.to_string()),
    )
}
