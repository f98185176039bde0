//! CLI for inspecting and simulating task retry policies.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskretry_core::config;
use taskretry_core::retry::RetryVault;

use commands::{run_config, run_explain, run_interval, run_simulate};

/// Top-level CLI for taskretry.
#[derive(Debug, Parser)]
#[command(name = "taskretry")]
#[command(about = "taskretry: retry policies for external task workers", long_about = None)]
pub struct Cli {
    /// Read settings from this file instead of the XDG config.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Kind of failure to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailureKind {
    Retryable,
    Incident,
    Business,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show how a retry specification resolves, with its full countdown.
    Explain {
        /// Specification, e.g. `R3/PT5M` or `PT10S,PT2M`.
        spec: String,
    },

    /// Print the wait in milliseconds for a given number of remaining retries.
    Interval {
        /// Specification, e.g. `R3/PT5M` or `PT10S,PT2M`.
        spec: String,
        /// Retries left after the failure.
        #[arg(long, allow_negative_numbers = true)]
        remaining: Option<i32>,
    },

    /// Dispatch a simulated failure and print the completion call it produces.
    Simulate {
        /// Per-task override specification.
        #[arg(long)]
        spec: Option<String>,
        /// Retry counter the engine currently holds (omit for a first failure).
        #[arg(long, allow_negative_numbers = true)]
        retries: Option<i32>,
        /// Failure kind to raise.
        #[arg(long, value_enum, default_value = "retryable")]
        kind: FailureKind,
        /// Failure message (business error code for `--kind business`).
        #[arg(long, default_value = "simulated failure")]
        message: String,
    },

    /// Show the config file location and effective settings.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        let vault = RetryVault::from_config(&cfg.retry);

        match cli.command {
            CliCommand::Explain { spec } => run_explain(&vault, &spec)?,
            CliCommand::Interval { spec, remaining } => run_interval(&vault, &spec, remaining)?,
            CliCommand::Simulate {
                spec,
                retries,
                kind,
                message,
            } => run_simulate(&vault, spec.as_deref(), retries, kind, &message)?,
            CliCommand::Config => run_config(cli.config.as_deref(), &cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
