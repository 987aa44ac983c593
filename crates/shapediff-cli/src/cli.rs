use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shapediff",
    about = "Schema-directed structural diff and patch for JSON values",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the patch that turns OLD into NEW
    Diff(DiffArgs),
    /// Apply a patch to a value
    Apply(ApplyArgs),
    /// Rewrite a patch into normal form
    Normalize(NormalizeArgs),
    /// Diff, re-apply and compare: verify the round trip for two values
    Check(CheckArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// Schema document (JSON)
    #[arg(short, long)]
    pub schema: PathBuf,
    pub old: PathBuf,
    pub new: PathBuf,
    /// Normalize the produced patch
    #[arg(long)]
    pub normalize: bool,
    /// Engine configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Patch document (JSON)
    #[arg(short, long)]
    pub patch: PathBuf,
    pub old: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct NormalizeArgs {
    pub patch: PathBuf,
}

#[derive(Args)]
pub struct CheckArgs {
    #[arg(short, long)]
    pub schema: PathBuf,
    pub old: PathBuf,
    pub new: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
