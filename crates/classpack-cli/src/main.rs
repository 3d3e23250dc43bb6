//! classpack command-line tool
//!
//! Builds, inspects and removes the merged class cache described by a
//! `classpack.toml` manifest.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::Overrides;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "classpack")]
#[command(about = "Bundle single-type PHP files into one dependency-ordered cache", long_about = None)]
#[command(version)]
struct Cli {
    /// Manifest file (default: classpack.toml in this or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// When to color output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    color: String,

    /// Log more (-v info, -vv debug, -vvv trace); CLASSPACK_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the cache artifact, building it first if needed
    Build {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the dependency-respecting unit order without writing anything
    Order {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Delete the cache artifact
    Clean {
        /// Artifact path (overrides the manifest)
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("CLASSPACK_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let color = output::resolve_color_choice(Some(&cli.color));
    let manifest = cli.config.as_deref();

    match cli.command {
        Commands::Build { overrides } => commands::build::execute(manifest, &overrides, color),
        Commands::Order { overrides } => commands::order::execute(manifest, &overrides, color),
        Commands::Clean { cache } => commands::clean::execute(manifest, cache, color),
    }
}
