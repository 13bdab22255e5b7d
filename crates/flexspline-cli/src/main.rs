//! FlexSpline CLI - Place, replay and inspect spline mesh scenes

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{layers, place, simulate};
use env_logger::Env;

#[derive(Parser)]
#[command(name = "flexspline")]
#[command(about = "Procedural mesh layers along a spline", long_about = None)]
#[command(version)]
struct Cli {
    /// Log reconciliation passes
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a scene once and print every placement
    Place {
        /// Path to scene file
        scene: String,

        /// Output format (json or text)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,

        /// Include hidden instances
        #[arg(long)]
        all: bool,
    },

    /// Replay the scene's edits, reconciling after each one
    Simulate {
        /// Path to scene file
        scene: String,

        /// Output format (json or text)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// List the scene's layers
    Layers {
        /// Path to scene file
        scene: String,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "json" | "text" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: json, text", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Place { scene, format, all } => place::run(&scene, &format, all),
        Commands::Simulate { scene, format } => simulate::run(&scene, &format),
        Commands::Layers { scene } => layers::run(&scene),
    }
}
