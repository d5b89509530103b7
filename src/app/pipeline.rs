//! Shared "request pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! form input -> validated request -> rate service -> chart datasets
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::sync::Arc;

use crate::chart::{ChartFrame, ChartState};
use crate::config::ServiceConfig;
use crate::data::{OfflineRateService, RateClient, RateService};
use crate::domain::{DisplayMode, LoanRequest, RawLoanInput};
use crate::error::AppError;

/// Pick the HTTP client or the offline schedule per config.
pub fn build_service(config: &ServiceConfig) -> Result<Arc<dyn RateService>, AppError> {
    if config.offline {
        let today = chrono::Local::now().date_naive();
        return Ok(Arc::new(OfflineRateService::new(today)));
    }
    Ok(Arc::new(RateClient::new(config)?))
}

/// All computed outputs of a single `fetch` run.
#[derive(Debug, Clone)]
pub struct FetchOutput {
    pub request: LoanRequest,
    pub frame: ChartFrame,
}

/// Validate, call the service once, and derive the datasets in `mode`.
///
/// Validation failures return before the service is touched.
pub fn run_fetch(
    service: &dyn RateService,
    raw: &RawLoanInput,
    mode: DisplayMode,
) -> Result<FetchOutput, AppError> {
    let request = crate::request::format(raw)?;
    let series = service.calculate_rates(&request)?;

    // No surface: the CLI only needs the derived datasets.
    let mut chart: ChartState<()> = ChartState::present(series, request.rate_floor, request.rate_ceiling);
    if mode != chart.display_mode() {
        chart.toggle_mode();
    }

    Ok(FetchOutput {
        frame: chart.frame(),
        request,
    })
}
