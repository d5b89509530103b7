//! Domain types shared by the formatter, the rate client and the chart.
//!
//! This module defines:
//!
//! - form input and the normalized service request (`RawLoanInput`, `LoanRequest`)
//! - the returned schedule (`RatePoint`, `RateSeries`)
//! - chart display settings (`DisplayMode`)

pub mod types;

pub use types::*;
