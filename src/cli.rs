use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Conditional-spectrum ground-motion record selection.
#[derive(Parser)]
#[command(
    name = "gmsel",
    version,
    about = "Select and scale ground-motion records to match a target spectrum"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run the full selection pipeline.
    Select(SelectArgs),
    /// Compute and write only the target spectrum statistics.
    Target(TargetArgs),
}

/// Arguments for the `select` subcommand.
#[derive(clap::Args)]
pub struct SelectArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "gmsel.toml")]
    pub config: PathBuf,

    /// Override output JSON path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Arguments for the `target` subcommand.
#[derive(clap::Args)]
pub struct TargetArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "gmsel.toml")]
    pub config: PathBuf,

    /// Path for the target JSON output.
    #[arg(short, long, default_value = "target.json")]
    pub output: PathBuf,
}
