//! Command-line parsing.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the request/chart code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "loan-rates", version, about = "Loan interest-rate schedule viewer")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Rate service base URL (overrides RATE_SERVICE_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Compute schedules locally from a synthetic SOFR curve instead of calling the service.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Append logs to this file (overrides LOAN_RATES_LOG_FILE).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (the default).
    Tui,
    /// Request a schedule once and print it.
    Fetch(FetchArgs),
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Maturity date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub maturity_date: String,

    /// Rate floor as a decimal fraction (e.g. 0.02).
    #[arg(long, allow_hyphen_values = true)]
    pub floor: String,

    /// Rate ceiling as a decimal fraction (e.g. 0.2).
    #[arg(long, allow_hyphen_values = true)]
    pub ceiling: String,

    /// Spread over the reference rate as a decimal fraction (e.g. 0.01).
    #[arg(long, allow_hyphen_values = true)]
    pub spread: String,

    /// Print rates as percentages.
    #[arg(long)]
    pub percent: bool,

    /// Export the schedule to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
