use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::run::Scenario;

#[derive(Parser)]
#[command(name = "uniqra-cmd")]
#[command(about = "Walks through managing C-allocated resources with uniqra handles")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv to trace every allocate and free)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one walkthrough scenario, or all of them
    Run {
        /// Scenario to run
        #[arg(value_enum, default_value_t = Scenario::All)]
        scenario: Scenario,

        /// Value stored in the first sample allocated by each scenario
        #[arg(long, default_value_t = 0.0)]
        value: f64,
    },

    /// List the available scenarios
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { scenario, value } => commands::run::run(scenario, value),
        Commands::List => commands::list::run(),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
