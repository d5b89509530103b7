//! Offline rate schedule, computed locally from a synthetic SOFR forward path.
//!
//! Useful for demos and for running the TUI without the rate service. The
//! schedule follows the service's rules: one reset per month starting at the
//! as-of date, stopping after maturity, each rate being
//! `min(ceiling, max(floor, sofr + spread))` rounded to 6 decimals.

use chrono::{Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::{debug, error, warn};

use crate::data::RateService;
use crate::domain::{LoanRequest, RatePoint, RateSeries};
use crate::error::ServiceError;

/// Length of the synthetic forward curve (monthly points).
const CURVE_MONTHS: usize = 360;

#[derive(Debug, Clone)]
pub struct OfflineRateService {
    pub as_of: NaiveDate,
    /// One-month SOFR at the as-of date (decimal).
    pub base_sofr: f64,
    /// Std dev of the monthly SOFR change (decimal).
    pub monthly_vol: f64,
    pub seed: u64,
}

impl OfflineRateService {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            base_sofr: 0.0430,
            monthly_vol: 0.0008,
            seed: 42,
        }
    }

    /// Synthetic one-month SOFR forwards, one per month from `as_of`.
    ///
    /// A non-finite or negative `monthly_vol` gives a flat curve.
    pub fn forward_curve(&self) -> Vec<f64> {
        let noise = Normal::new(0.0, self.monthly_vol)
            .ok()
            .filter(|_| self.monthly_vol.is_finite() && self.monthly_vol >= 0.0);
        if noise.is_none() {
            warn!(monthly_vol = self.monthly_vol, "unusable volatility, using a flat SOFR curve");
        }
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut level = self.base_sofr;
        let mut curve = Vec::with_capacity(CURVE_MONTHS);
        for _ in 0..CURVE_MONTHS {
            curve.push(round_to(level.max(0.0), 4));
            if let Some(normal) = &noise {
                level += normal.sample(&mut rng);
            }
        }
        curve
    }
}

impl RateService for OfflineRateService {
    fn calculate_rates(&self, request: &LoanRequest) -> Result<RateSeries, ServiceError> {
        let curve = self.forward_curve();
        let series = build_schedule(self.as_of, &curve, request);
        debug!(points = series.len(), "offline schedule computed");

        if series.is_empty() {
            let err = ServiceError::BadStatus {
                status: 400,
                message: "Failed to calculate rates due to invalid parameters.".to_string(),
            };
            error!(error = %err, "error fetching rates");
            return Err(err);
        }
        Ok(series)
    }
}

/// Apply spread, floor and ceiling to `curve`, one point per monthly reset.
///
/// Reset dates advance one month at a time from the previous reset, so a
/// month-end start drifts to shorter month ends (Jan 31, Feb 28, Mar 28).
pub fn build_schedule(as_of: NaiveDate, curve: &[f64], request: &LoanRequest) -> RateSeries {
    let mut out = Vec::new();
    let mut date = as_of;

    for &sofr in curve {
        if date > request.maturity_date {
            break;
        }
        // Not `f64::clamp`: floor > ceiling must yield the ceiling, not panic.
        let rate = request
            .rate_ceiling
            .min(request.rate_floor.max(sofr + request.rate_spread));
        out.push(RatePoint {
            date: date.format("%Y-%m-%d").to_string(),
            rate: round_to(rate, 6),
        });

        match date.checked_add_months(Months::new(1)) {
            Some(next) => date = next,
            None => break,
        }
    }
    out
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
