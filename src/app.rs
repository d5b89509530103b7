//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves configuration (env + flags)
//! - sets up logging
//! - runs the TUI or a one-shot fetch

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, FetchArgs, GlobalArgs};
use crate::config::ServiceConfig;
use crate::domain::{DisplayMode, RawLoanInput};
use crate::error::AppError;
use crate::telemetry::LogTarget;

pub mod pipeline;

/// Entry point for the `loan-rates` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = resolve_config(&cli.global)?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => handle_tui(config),
        Command::Fetch(args) => handle_fetch(config, args),
    }
}

/// Environment first, then CLI flags on top.
pub fn resolve_config(global: &GlobalArgs) -> Result<ServiceConfig, AppError> {
    let mut config = ServiceConfig::from_env()?;
    if let Some(url) = &global.base_url {
        config = config.with_base_url(url)?;
    }
    if global.offline {
        config.offline = true;
    }
    if let Some(path) = &global.log_file {
        config.log_file = Some(path.clone());
    }
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frontend {
    Tui,
    Fetch,
}

/// The TUI draws on the terminal, so it never logs to stdout/stderr.
fn log_target(config: &ServiceConfig, frontend: Frontend) -> LogTarget {
    match (&config.log_file, frontend) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, Frontend::Tui) => LogTarget::Off,
        (None, Frontend::Fetch) => LogTarget::Stderr,
    }
}

fn handle_tui(config: ServiceConfig) -> Result<(), AppError> {
    crate::telemetry::init_tracing(&log_target(&config, Frontend::Tui))?;
    info!(base_url = %config.base_url, offline = config.offline, "starting TUI");

    let service = pipeline::build_service(&config)?;
    crate::tui::run(service)
}

fn handle_fetch(config: ServiceConfig, args: FetchArgs) -> Result<(), AppError> {
    crate::telemetry::init_tracing(&log_target(&config, Frontend::Fetch))?;

    let service = pipeline::build_service(&config)?;
    let raw = RawLoanInput {
        maturity_date: args.maturity_date,
        rate_floor: args.floor,
        rate_ceiling: args.ceiling,
        rate_spread: args.spread,
    };
    let mode = if args.percent {
        DisplayMode::Percentage
    } else {
        DisplayMode::Decimal
    };

    let out = pipeline::run_fetch(service.as_ref(), &raw, mode)?;
    println!("{}", crate::report::format_schedule(&out.request, &out.frame));

    if let Some(path) = &args.export {
        crate::io::export::write_series_csv(path, &out.frame)?;
        info!(path = %path.display(), "schedule exported");
    }

    Ok(())
}
