//! Rate sources: the HTTP rate service and an offline stand-in.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::domain::{LoanRequest, RateSeries};
use crate::error::ServiceError;

pub mod client;
pub mod offline;

pub use client::RateClient;
pub use offline::OfflineRateService;

/// Anything that can turn a loan request into a rate schedule.
///
/// One call is one attempt; implementations never retry.
pub trait RateService: Send + Sync {
    fn calculate_rates(&self, request: &LoanRequest) -> Result<RateSeries, ServiceError>;
}

/// Result of a background request, tagged with the generation it was issued in.
#[derive(Debug)]
pub struct RateResponse {
    pub generation: u64,
    pub request: LoanRequest,
    pub result: Result<RateSeries, ServiceError>,
}

/// Run `service` on a worker thread and deliver the outcome on `tx`.
///
/// The receiver may be gone by the time the call completes; the result is then
/// dropped.
pub fn spawn_request(
    service: Arc<dyn RateService>,
    generation: u64,
    request: LoanRequest,
    tx: Sender<RateResponse>,
) {
    thread::spawn(move || {
        let result = service.calculate_rates(&request);
        let _ = tx.send(RateResponse {
            generation,
            request,
            result,
        });
    });
}
