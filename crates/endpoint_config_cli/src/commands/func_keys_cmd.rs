//! Function key inspection command for the pbx-confgen CLI.
//!
//! Prints the effective function keys of a user: the user's private template
//! layered over the public template it is attached to.
//!
//! # Examples
//!
//! ```bash
//! # Show the merged keys of user 42 as JSON
//! pbx-confgen func-keys --input dump.toml --user 42
//!
//! # Human-readable listing
//! pbx-confgen func-keys --input dump.toml --user 42 --display pretty
//! ```

use std::path::Path;

use clap::Args;
use colored::Colorize;
use endpoint_config::{ConfigurationDump, FuncKeyTemplate};
use tracing::{debug, instrument};

use super::resolve_cmd::load_dump;
use crate::errors::Error;

#[cfg(test)]
#[path = "func_keys_cmd_tests.rs"]
mod tests;

/// Arguments for the func-keys command
#[derive(Args, Debug, Clone)]
pub struct FuncKeysArgs {
    /// Configuration dump holding the templates (TOML or JSON)
    #[arg(short, long)]
    pub input: String,

    /// Dump encoding ("toml" or "json"); guessed from the file extension when omitted
    #[arg(short, long)]
    pub format: Option<String>,

    /// User whose keys are shown
    #[arg(short, long)]
    pub user: u64,

    /// Output format ("json" or "pretty")
    #[arg(short, long, default_value = "json")]
    pub display: String,
}

/// Merged function keys of `user_id`.
pub fn effective_func_keys(
    dump: &ConfigurationDump,
    user_id: u64,
) -> Result<FuncKeyTemplate, Error> {
    dump.user_func_keys(user_id)?
        .ok_or(Error::UnknownUser(user_id))
}

/// Renders a merged template as JSON or as a position listing.
pub fn format_func_keys(keys: &FuncKeyTemplate, display: &str) -> Result<String, Error> {
    match display {
        "json" => serde_json::to_string_pretty(keys)
            .map_err(|e| Error::Output(format!("Failed to serialize to JSON: {}", e))),
        "pretty" => format_func_keys_pretty(keys),
        _ => Err(Error::InvalidArguments(format!(
            "Invalid format: '{}'. Use 'json' or 'pretty'.",
            display
        ))),
    }
}

fn format_func_keys_pretty(keys: &FuncKeyTemplate) -> Result<String, Error> {
    if keys.is_empty() {
        return Ok(format!("{}", "(no function keys)".dimmed()));
    }

    let mut output = String::new();
    for (position, key) in &keys.keys {
        let destination = serde_json::to_string(&key.destination)
            .map_err(|e| Error::Output(format!("Failed to serialize destination: {}", e)))?;
        let label = key.label.as_deref().unwrap_or("-");
        output.push_str(&format!(
            "{:>3}  {}  {}{}\n",
            position.to_string().bold(),
            label,
            destination,
            if key.blf { " [blf]".green().to_string() } else { String::new() }
        ));
    }
    Ok(output)
}

/// Execute the func-keys command
#[instrument]
pub fn execute(args: &FuncKeysArgs) -> Result<(), Error> {
    let dump = load_dump(Path::new(&args.input), args.format.as_deref())?;
    let keys = effective_func_keys(&dump, args.user)?;
    debug!(user = args.user, keys = keys.len(), "Merged function key templates");

    println!("{}", format_func_keys(&keys, &args.display)?);
    Ok(())
}
