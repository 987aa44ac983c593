use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shapediff_diff::{normalize, DiffConfig, Differ};
use shapediff_schema::Schema;
use shapediff_types::{Patch, PatchStats};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Diff(args) => cmd_diff(args, format),
        Command::Apply(args) => cmd_apply(args, format),
        Command::Normalize(args) => cmd_normalize(args, format),
        Command::Check(args) => cmd_check(args, format),
    }
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let patch = diff_files(&args)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&patch)?),
        OutputFormat::Text => print_patch(&patch),
    }
    Ok(())
}

fn cmd_apply(args: ApplyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let value = apply_files(&args)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let patch = load_patch(&args.patch)?;
    let before = patch.steps().len();
    let normalized = normalize(patch);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&normalized)?),
        OutputFormat::Text => {
            println!(
                "{} Normalized: {} steps → {} steps",
                "✓".green().bold(),
                before,
                normalized.steps().len().to_string().bold()
            );
            println!("  {normalized}");
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = check_files(&args)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            if report.round_trip {
                println!("{} Round trip verified", "✓".green().bold());
            } else {
                println!("{} Round trip failed: patch does not reproduce NEW", "✗".red().bold());
            }
            println!("  Steps: {}", report.steps);
            println!("  Depth: {}", report.depth);
            print_stats(&report.stats);
        }
    }
    if !report.round_trip {
        anyhow::bail!("round trip check failed");
    }
    Ok(())
}

/// Outcome of `shapediff check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub round_trip: bool,
    pub steps: usize,
    pub depth: usize,
    pub stats: PatchStats,
}

pub fn diff_files(args: &DiffArgs) -> anyhow::Result<Patch> {
    let schema = load_schema(&args.schema)?;
    let mut config = load_config(args.config.as_deref())?;
    config.normalize |= args.normalize;
    let old: Value = read_json(&args.old)?;
    let new: Value = read_json(&args.new)?;
    let patch = Differ::with_config(&schema, config).diff(&old, &new)?;
    Ok(patch)
}

pub fn apply_files(args: &ApplyArgs) -> anyhow::Result<Value> {
    let schema = load_schema(&args.schema)?;
    let config = load_config(args.config.as_deref())?;
    let patch = load_patch(&args.patch)?;
    let old: Value = read_json(&args.old)?;
    let value = Differ::with_config(&schema, config).apply(&patch, &old)?;
    Ok(value)
}

pub fn check_files(args: &CheckArgs) -> anyhow::Result<CheckReport> {
    let schema = load_schema(&args.schema)?;
    let config = load_config(args.config.as_deref())?;
    let old: Value = read_json(&args.old)?;
    let new: Value = read_json(&args.new)?;

    let differ = Differ::with_config(&schema, config);
    let patch = differ.diff(&old, &new)?;
    let applied = differ.apply(&patch, &old)?;
    Ok(CheckReport {
        round_trip: applied == new,
        steps: patch.steps().len(),
        depth: patch.depth(),
        stats: patch.stats(),
    })
}

pub fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    let text = fs::read_to_string(path).with_context(|| format!("reading schema {}", path.display()))?;
    let schema = Schema::from_json(&text).with_context(|| format!("parsing schema {}", path.display()))?;
    schema.validate()?;
    debug!(path = %path.display(), definitions = schema.definitions.len(), "loaded schema");
    Ok(schema)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<DiffConfig> {
    let Some(path) = path else {
        return Ok(DiffConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: DiffConfig = toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

pub fn load_patch(path: &Path) -> anyhow::Result<Patch> {
    let text = fs::read_to_string(path).with_context(|| format!("reading patch {}", path.display()))?;
    let patch = Patch::from_json(&text).with_context(|| format!("parsing patch {}", path.display()))?;
    Ok(patch)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_patch(patch: &Patch) {
    let steps = patch.steps();
    if steps.is_empty() {
        println!("No changes.");
        return;
    }
    for step in steps {
        println!("  {}", describe_step(step));
    }
    print_stats(&patch.stats());
}

fn describe_step(step: &Patch) -> String {
    match step {
        Patch::StructAdd { path, patch } => format!("{} {} {}", "+".green(), path.to_string().bold(), patch),
        Patch::StructRemove { path } => format!("{} {}", "-".red(), path.to_string().bold()),
        Patch::StructUpdate { path, patch } => format!("{} {} {}", "~".yellow(), path.to_string().bold(), patch),
        Patch::ArrayAppend { values } => format!("{} append {} values", "+".green(), values.len()),
        Patch::ArraySlice { from, until } => format!("{} keep [{from}, {until})", "-".red()),
        Patch::ArrayUpdate { index, patch } => format!("{} [{}] {}", "~".yellow(), index.to_string().bold(), patch),
        Patch::Replace { value } => format!("{} {}", "=".cyan(), value),
        other => other.to_string(),
    }
}

fn print_stats(stats: &PatchStats) {
    println!(
        "{} changes: {} added, {} removed, {} updated, {} replaced",
        stats.changes().to_string().bold(),
        stats.struct_adds + stats.array_appends,
        stats.struct_removes + stats.array_slices,
        stats.struct_updates + stats.array_updates,
        stats.replaces,
    );
}
