//! Form input normalization.
//!
//! Turns the four free-text form fields into a [`LoanRequest`]. Nothing here
//! touches the network: a request that fails validation is never sent.

use chrono::NaiveDate;

use crate::domain::{INPUT_DATE_FORMAT, LoanRequest, RawLoanInput, ReferenceRate};
use crate::error::ValidationError;

/// Validate and normalize raw form input.
///
/// Rate fields must each parse as a finite number. The maturity date must be a
/// real calendar date in `YYYY-MM-DD` form.
pub fn format(input: &RawLoanInput) -> Result<LoanRequest, ValidationError> {
    let rate_floor = parse_rate(&input.rate_floor, "rate floor")?;
    let rate_ceiling = parse_rate(&input.rate_ceiling, "rate ceiling")?;
    let rate_spread = parse_rate(&input.rate_spread, "rate spread")?;
    let maturity_date = parse_maturity(&input.maturity_date)?;

    Ok(LoanRequest {
        maturity_date,
        reference_rate: ReferenceRate::Sofr,
        rate_floor,
        rate_ceiling,
        rate_spread,
    })
}

fn parse_rate(raw: &str, field: &'static str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::NonNumericRate { field })
}

fn parse_maturity(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, INPUT_DATE_FORMAT).map_err(|_| ValidationError::MalformedDate {
        input: trimmed.to_string(),
    })
}
