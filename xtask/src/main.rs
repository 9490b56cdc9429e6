//! Level tooling for HAILEY
//!
//! Usage:
//!   cargo xtask validate-levels [DIR]          # Load and check every level file
//!   cargo xtask convert-json IN.json OUT.ron   # Legacy JSON level to RON

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hailey::config::GameConfig;
use hailey::world::{discover_levels, load_descriptor, load_descriptor_from_json, save_descriptor, LevelDescriptor};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Level tooling for HAILEY")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every level in a directory and report problems
    ValidateLevels {
        /// Directory to scan (default: assets/levels)
        dir: Option<PathBuf>,
        /// Config override file used for platform sizes (default: assets/config.ron)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Convert a legacy JSON level file into a RON descriptor
    ConvertJson {
        input: PathBuf,
        output: PathBuf,
        /// Write brotli-compressed RON instead of plain text
        #[arg(long)]
        compress: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::ValidateLevels { dir, config } => {
            let root = project_root()?;
            let dir = dir.unwrap_or_else(|| root.join("assets/levels"));
            let config = config.unwrap_or_else(|| root.join(hailey::config::CONFIG_PATH));
            validate_levels(&dir, &config)
        }
        Commands::ConvertJson { input, output, compress } => convert_json(&input, &output, compress),
    }
}

/// Get the project root directory
fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask has no parent directory")
}

/// Check platform images against the configured sizes.
fn check_platforms(desc: &LevelDescriptor, config: &GameConfig) -> Result<()> {
    for platform in &desc.platforms {
        config
            .platform_size(&platform.image)
            .with_context(|| format!("platform at ({}, {})", platform.x, platform.y))?;
    }
    Ok(())
}

fn validate_levels(dir: &Path, config_path: &Path) -> Result<()> {
    let config = if config_path.exists() {
        GameConfig::load(config_path).with_context(|| format!("loading {}", config_path.display()))?
    } else {
        GameConfig::default()
    };

    let levels = discover_levels(dir);
    if levels.is_empty() {
        anyhow::bail!("no level files in {}", dir.display());
    }

    println!("Validating {} levels in {}", levels.len(), dir.display());
    let mut failures = 0;
    for info in &levels {
        let result = load_descriptor(&info.path)
            .with_context(|| format!("loading {}", info.path.display()))
            .and_then(|desc| check_platforms(&desc, &config).map(|_| desc));

        match result {
            Ok(desc) => println!(
                "  ok    {:<12} {} platforms, {} spiders, {} coins{}{}",
                info.name,
                desc.platforms.len(),
                desc.spiders.len(),
                desc.coins.len(),
                if desc.pull_door().is_some() { ", pull-door" } else { "" },
                if desc.water.is_some() { ", water" } else { "" },
            ),
            Err(e) => {
                failures += 1;
                println!("  FAIL  {:<12} {:#}", info.name, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} levels failed", failures, levels.len());
    }
    println!("All levels valid.");
    Ok(())
}

fn convert_json(input: &Path, output: &Path, compress: bool) -> Result<()> {
    let text = std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let desc = load_descriptor_from_json(&text).with_context(|| format!("parsing {}", input.display()))?;
    check_platforms(&desc, &GameConfig::default())?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    save_descriptor(&desc, output, !compress).with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Converted {} -> {}{}",
        input.display(),
        output.display(),
        if compress { " (brotli)" } else { "" }
    );
    Ok(())
}
