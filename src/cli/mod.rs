//! Command-line interface for Factorizer
//!
//! This module provides the main CLI structure and command dispatch. It uses
//! clap for argument parsing; each command lives in its own module under
//! `commands`.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

pub mod commands;
mod output;

pub use output::Output;

/// Factorizer - classify integer ranges into primes and composites
#[derive(Parser)]
#[command(
    name = "factorizer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Classify integer ranges into primes and composites",
    long_about = "Factorizer classifies every integer in a range as prime or composite, recording \
                  the full divisor list of each composite. Four interchangeable execution strategies \
                  (sequential, unbounded, pool, stream) can be compared side by side."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Classify a range once and report counts and runtime
    Run(commands::run::RunArgs),
    /// Line-mode request loop reading ranges and modes from stdin
    Prompt(commands::prompt::PromptArgs),
    /// Classify with a live prime counter; Ctrl-C cancels
    Watch(commands::watch::WatchArgs),
    /// Run every strategy over the same range and compare timings
    Compare(commands::compare::CompareArgs),
    /// Configuration management
    #[command(subcommand)]
    Config(commands::config::ConfigCommands),
    /// Show version information
    Version,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);
        let config_path = self.config.as_deref();

        match self.command {
            Some(Commands::Run(args)) => commands::run::execute(args, config_path, &output).await,
            Some(Commands::Prompt(args)) => {
                commands::prompt::execute(args, config_path, &output).await
            }
            Some(Commands::Watch(args)) => {
                commands::watch::execute(args, config_path, &output).await
            }
            Some(Commands::Compare(args)) => {
                commands::compare::execute(args, config_path, &output).await
            }
            Some(Commands::Config(cmd)) => commands::config::execute(cmd, config_path).await,
            Some(Commands::Version) => commands::version::execute(&output).await,
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // stderr keeps stdout clean for --format json
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
