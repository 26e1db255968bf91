mod commands;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Inspect the stage graph of pipeline executions
#[derive(Parser, Debug)]
#[command(name = "stagegraph", version, about)]
struct Cli {
    /// Log graph resolution details (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that an execution's stage graph is well formed
    Validate(commands::validate::ValidateArgs),
    /// Print top-level stages in execution order
    Order(commands::order::OrderArgs),
    /// Show ancestors, downstream stages and timeout of one stage
    Inspect(commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Validate(args) => commands::validate::execute(args),
        Command::Order(args) => commands::order::execute(args),
        Command::Inspect(args) => commands::inspect::execute(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
