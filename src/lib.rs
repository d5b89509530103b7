//! `loan-rates` library crate.
//!
//! The binary (`loan-rates`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the chart state machine stays independent of the terminal front-end
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod request;
pub mod telemetry;
pub mod tui;
