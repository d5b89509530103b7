//! Shared domain types.
//!
//! These types mirror the rate service's JSON contract so they can be:
//!
//! - built from form input and posted as-is
//! - decoded straight from the response body
//! - exported to CSV or printed without extra mapping

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire format for the maturity date.
pub const WIRE_DATE_FORMAT: &str = "%m/%d/%Y";

/// Input format of the maturity date field.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Reference index the loan floats over.
///
/// Only SOFR is quoted by the service today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferenceRate {
    #[default]
    #[serde(rename = "SOFR")]
    Sofr,
}

impl ReferenceRate {
    pub fn display_name(self) -> &'static str {
        match self {
            ReferenceRate::Sofr => "SOFR",
        }
    }
}

/// Unvalidated form fields, exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLoanInput {
    /// ISO date (`YYYY-MM-DD`).
    pub maturity_date: String,
    pub rate_floor: String,
    pub rate_ceiling: String,
    pub rate_spread: String,
}

/// Normalized request body for `POST /api/calculate-rates`.
///
/// Rates are decimal fractions (`0.02` = 2%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    #[serde(with = "wire_date")]
    pub maturity_date: NaiveDate,
    pub reference_rate: ReferenceRate,
    pub rate_floor: f64,
    pub rate_ceiling: f64,
    pub rate_spread: f64,
}

impl LoanRequest {
    /// Maturity date as sent on the wire (`MM/DD/YYYY`).
    pub fn wire_maturity_date(&self) -> String {
        self.maturity_date.format(WIRE_DATE_FORMAT).to_string()
    }
}

/// One observation of the computed schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: String,
    /// Decimal fraction.
    pub rate: f64,
}

/// Ordered schedule, ascending by date as returned by the service.
pub type RateSeries = Vec<RatePoint>;

/// How rates are shown on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Decimal,
    Percentage,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Decimal => DisplayMode::Percentage,
            DisplayMode::Percentage => DisplayMode::Decimal,
        }
    }

    /// Multiplier applied to decimal fractions in this mode.
    pub fn scale(self) -> f64 {
        match self {
            DisplayMode::Decimal => 1.0,
            DisplayMode::Percentage => 100.0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DisplayMode::Decimal => "Decimal",
            DisplayMode::Percentage => "Percentage",
        }
    }

    /// Axis/column unit label.
    pub fn unit_label(self) -> &'static str {
        match self {
            DisplayMode::Decimal => "rate (decimal)",
            DisplayMode::Percentage => "rate (%)",
        }
    }
}

mod wire_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::WIRE_DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(WIRE_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, WIRE_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
