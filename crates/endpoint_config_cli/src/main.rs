use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use endpoint_config_cli::commands::{
    config_cmd::{self, ConfigCommands},
    func_keys_cmd::{self, FuncKeysArgs},
    resolve_cmd::{self, ResolveArgs},
};
use endpoint_config_cli::errors::Error;

/// pbx-confgen: Resolve PBX endpoint configuration templates
#[derive(Parser)]
#[command(name = "pbx-confgen")]
#[command(about = "Resolve PBX endpoint configuration templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Resolve endpoint descriptors into final configuration records
    Resolve(ResolveArgs),

    /// Show the merged function keys of a user
    FuncKeys(FuncKeysArgs),

    /// Show the CLI version
    Version,
}

fn run(command: &Commands) -> Result<(), Error> {
    match command {
        Commands::Config(cmd) => config_cmd::execute(cmd),
        Commands::Resolve(args) => resolve_cmd::execute(args),
        Commands::FuncKeys(args) => func_keys_cmd::execute(args),
        Commands::Version => {
            println!(
                "pbx-confgen version {}",
                option_env!("PBX_CONFGEN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
            );
            Ok(())
        }
    }
}

fn main() {
    // Logs go to stderr; stdout carries the resolved records.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("PBX_CONFGEN_LOG"))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli.command) {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
