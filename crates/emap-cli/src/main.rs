//! eMap pattern-mining CLI entry point.
//!
//! Loads a dataset of host structures and mined residue patterns, finds
//! every pattern's occurrences, clusters them and prints the reports.

use anyhow::{Context, Result};
use clap::Parser;
use emap_core::{ClusteringOption, EmapError, MiningConfig};
use emap_mining::SubgraphPattern;
use std::path::{Path, PathBuf};

mod dataset;

use dataset::Dataset;

/// eMap version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "emap-mine")]
#[command(version = VERSION)]
#[command(about = "eMap: occurrence discovery and clustering of residue-contact patterns", long_about = None)]
struct Args {
    /// Dataset JSON with host structures and mined patterns
    ///
    /// Example: --input results/dataset.json
    #[arg(short, long)]
    input: PathBuf,

    /// TOML file with mining thresholds
    ///
    /// Example: --config configs/emap.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Clustering shown in the reports: structural or sequence
    ///
    /// Overrides the `clustering` entry of the config file.
    #[arg(long)]
    clustering: Option<String>,

    /// Print the full report (adjacency of every occurrence) instead of the summary
    #[arg(long)]
    full_report: bool,

    /// Only process the pattern with this id (e.g. 1_W-W_4)
    #[arg(long)]
    pattern: Option<String>,

    // ========================================================================
    // Output
    // ========================================================================
    /// Directory receiving Graphviz DOT files for patterns and occurrences
    ///
    /// Example: --dot-dir out/graphs
    #[arg(long)]
    dot_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<MiningConfig> {
    let mut config = match &args.config {
        Some(path) => MiningConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MiningConfig::default(),
    };
    if let Some(option) = &args.clustering {
        config.clustering = option.parse::<ClusteringOption>()?;
    }
    config.validate()?;
    Ok(config)
}

fn write_graphs(pattern: &SubgraphPattern, dir: &Path) -> Result<usize> {
    let mut written = 0;
    pattern.write_dot(None, Some(&dir.join(format!("{}.dot", pattern.file_id()))))?;
    written += 1;
    for occurrence in pattern.occurrences() {
        let id = occurrence.id();
        let dest = dir.join(format!("{}_{}.dot", pattern.file_id(), id));
        pattern.write_dot(Some(id), Some(&dest))?;
        written += 1;
    }
    Ok(written)
}

/// Guidance for the first library error in the chain, or the plain chain.
fn describe(err: &anyhow::Error) -> String {
    match err.chain().find_map(|cause| cause.downcast_ref::<EmapError>()) {
        Some(emap) => format!("{:#}\n{}", err, emap.user_message()),
        None => format!("{:#}", err),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("eMap {} - Starting", VERSION);

    run(&args).map_err(|err| {
        log::error!("{}", describe(&err));
        err
    })
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    log::info!(
        "RMSD threshold {}, clustering {}, parallel scoring {}",
        config.rmsd_threshold,
        config.clustering,
        config.parallel
    );

    let dataset = Dataset::from_file(&args.input)?;
    let mut patterns = dataset.into_patterns(&config)?;

    if let Some(wanted) = &args.pattern {
        patterns.retain(|p| p.id() == wanted);
        if patterns.is_empty() {
            anyhow::bail!("No pattern with id '{}'", wanted);
        }
    }

    if let Some(dir) = &args.dot_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    for pattern in &mut patterns {
        pattern
            .find_protein_subgraphs(config.clustering)
            .with_context(|| format!("Discovery failed for pattern {}", pattern.id()))?;

        let report = if args.full_report {
            pattern.full_report()?
        } else {
            pattern.general_report()
        };
        println!("{}", report);

        if let Some(dir) = &args.dot_dir {
            let written = write_graphs(pattern, dir)?;
            log::info!("Wrote {} DOT files for {}", written, pattern.id());
        }
    }

    log::info!("Processed {} patterns", patterns.len());
    Ok(())
}
