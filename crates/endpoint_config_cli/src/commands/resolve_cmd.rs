//! Endpoint resolution command for the pbx-confgen CLI.
//!
//! Reads a configuration dump, resolves every configuration item against its
//! template graph and writes the resolved endpoint records as JSON.
//!
//! # Examples
//!
//! ```bash
//! # Resolve a TOML dump and print the records
//! pbx-confgen resolve --input dump.toml
//!
//! # Resolve a JSON dump into a file
//! pbx-confgen resolve --input dump.json --output endpoints.json
//! ```

use std::fs;
use std::path::Path;

use clap::Args;
use colored::Colorize;
use endpoint_config::{ConfigurationDump, DumpFormat, Resolution, ResolutionStats};
use tracing::{debug, info, instrument};

use crate::config::{AppConfig, OutputConfig};
use crate::errors::Error;

#[cfg(test)]
#[path = "resolve_cmd_tests.rs"]
mod tests;

/// Arguments for the resolve command
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Configuration dump to resolve (TOML or JSON)
    #[arg(short, long)]
    pub input: String,

    /// Dump encoding ("toml" or "json"); guessed from the file extension when omitted
    #[arg(short, long)]
    pub format: Option<String>,

    /// Path to the CLI configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// File to write the records to instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Parses an explicit dump format name.
pub fn parse_format(format: &str) -> Result<DumpFormat, Error> {
    match format.to_ascii_lowercase().as_str() {
        "toml" => Ok(DumpFormat::Toml),
        "json" => Ok(DumpFormat::Json),
        _ => Err(Error::InvalidArguments(format!(
            "Invalid format: '{}'. Use 'toml' or 'json'.",
            format
        ))),
    }
}

/// Reads and parses the dump at `path`.
pub fn load_dump(path: &Path, format: Option<&str>) -> Result<ConfigurationDump, Error> {
    let format = match format {
        Some(name) => parse_format(name)?,
        None => DumpFormat::from_path(path),
    };
    debug!(path = ?path, ?format, "Loading configuration dump");

    let content = fs::read_to_string(path).map_err(|source| Error::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ConfigurationDump::parse(&content, format)?)
}

/// Serializes the resolution as configured by `output`.
///
/// The records are written as a bare JSON array unless counters were
/// requested, in which case the array is wrapped with them.
pub fn render_resolution(resolution: &Resolution, output: &OutputConfig) -> Result<String, Error> {
    let rendered = match (output.include_stats, output.pretty) {
        (true, true) => serde_json::to_string_pretty(resolution),
        (true, false) => serde_json::to_string(resolution),
        (false, true) => serde_json::to_string_pretty(&resolution.records),
        (false, false) => serde_json::to_string(&resolution.records),
    };
    rendered.map_err(|e| Error::Output(format!("Failed to serialize to JSON: {}", e)))
}

/// Human-readable summary of a resolution, written next to the records.
pub fn format_summary(stats: &ResolutionStats) -> String {
    format!(
        "{} {} endpoint(s) resolved ({} descriptor(s) built, {} template(s) skipped)",
        "✓".green(),
        stats.records_emitted.to_string().bold(),
        stats.descriptors_built,
        stats.templates_skipped.to_string().dimmed()
    )
}

/// Loads, resolves and renders a dump without touching stdout.
pub fn resolve_to_string(
    args: &ResolveArgs,
    config: &AppConfig,
) -> Result<(String, ResolutionStats), Error> {
    let dump = load_dump(Path::new(&args.input), args.format.as_deref())?;
    let resolution = dump.resolve(&config.resolver())?;
    let rendered = render_resolution(&resolution, &config.output)?;
    Ok((rendered, resolution.stats))
}

/// Execute the resolve command
#[instrument]
pub fn execute(args: &ResolveArgs) -> Result<(), Error> {
    let config = AppConfig::load_for_command(args.config.as_deref())?;
    let (rendered, stats) = resolve_to_string(args, &config)?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", rendered))
                .map_err(|e| Error::Output(format!("Failed to write {}: {}", path, e)))?;
            info!(path = %path, records = stats.records_emitted, "Resolved records written");
        }
        None => println!("{}", rendered),
    }

    eprintln!("{}", format_summary(&stats));
    Ok(())
}
