//! HTTP client for the rate-calculation service.

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::data::RateService;
use crate::domain::{LoanRequest, RateSeries};
use crate::error::{AppError, ServiceError};

pub struct RateClient {
    client: Client,
    url: String,
}

impl RateClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.calculate_rates_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn post(&self, request: &LoanRequest) -> Result<RateSeries, ServiceError> {
        // `.json()` sets `Content-Type: application/json`.
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ServiceError::BadStatus {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        resp.json::<RateSeries>()
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

impl RateService for RateClient {
    fn calculate_rates(&self, request: &LoanRequest) -> Result<RateSeries, ServiceError> {
        info!(
            url = %self.url,
            maturity = %request.wire_maturity_date(),
            "requesting rate schedule"
        );
        match self.post(request) {
            Ok(series) => {
                info!(points = series.len(), "rate schedule received");
                Ok(series)
            }
            Err(err) => {
                error!(error = %err, "error fetching rates");
                Err(err)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Prefer the service's `{"error": ...}` message, then the raw body, then the
/// status reason.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    reason.unwrap_or("unknown error").to_string()
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::ReferenceRate;

    struct Captured {
        request_line: String,
        headers: Vec<String>,
        body: String,
    }

    /// Serve exactly one HTTP response and hand back what the client sent.
    fn one_shot_server(status_line: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = Vec::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                headers.push(line.to_ascii_lowercase());
            }

            let mut req_body = vec![0u8; content_length];
            reader.read_exact(&mut req_body).unwrap();

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = stream;
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            Captured {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8(req_body).unwrap(),
            }
        });

        (base_url, handle)
    }

    fn client_for(base_url: &str) -> RateClient {
        let config = ServiceConfig::default()
            .with_base_url(base_url)
            .unwrap();
        let config = ServiceConfig {
            timeout: Duration::from_secs(5),
            ..config
        };
        RateClient::new(&config).unwrap()
    }

    fn sample_request() -> LoanRequest {
        LoanRequest {
            maturity_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            reference_rate: ReferenceRate::Sofr,
            rate_floor: 0.01,
            rate_ceiling: 0.05,
            rate_spread: 0.02,
        }
    }

    #[test]
    fn posts_json_and_returns_series_unchanged() {
        let (base_url, server) = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"[{"date":"2023-01-01","rate":0.015},{"date":"2023-02-01","rate":0.018}]"#,
        );
        let client = client_for(&base_url);

        let series = client.calculate_rates(&sample_request()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, "2023-01-01");
        assert_eq!(series[1].rate, 0.018);

        let captured = server.join().unwrap();
        assert_eq!(captured.request_line, "POST /api/calculate-rates HTTP/1.1");
        assert!(
            captured
                .headers
                .iter()
                .any(|h| h.starts_with("content-type:") && h.contains("application/json"))
        );
        let sent: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(sent["maturity_date"], "12/31/2023");
        assert_eq!(sent["reference_rate"], "SOFR");
        assert_eq!(sent["rate_spread"], 0.02);
    }

    #[test]
    fn non_success_status_carries_service_message() {
        let (base_url, server) = one_shot_server(
            "HTTP/1.1 400 BAD REQUEST",
            r#"{"error": "Failed to calculate rates due to invalid parameters."}"#,
        );
        let client = client_for(&base_url);

        match client.calculate_rates(&sample_request()) {
            Err(ServiceError::BadStatus { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Failed to calculate rates due to invalid parameters.");
            }
            other => panic!("expected BadStatus, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn undecodable_body_is_a_decode_error() {
        let (base_url, server) = one_shot_server("HTTP/1.1 200 OK", r#"{"rates": []}"#);
        let client = client_for(&base_url);

        assert!(matches!(
            client.calculate_rates(&sample_request()),
            Err(ServiceError::Decode(_))
        ));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_service_is_a_transport_error() {
        // Bind then drop to get a port nobody is listening on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = client_for(&format!("http://127.0.0.1:{port}"));

        assert!(matches!(
            client.calculate_rates(&sample_request()),
            Err(ServiceError::Transport(_))
        ));
    }

    #[test]
    fn error_message_fallbacks() {
        assert_eq!(error_message(r#"{"error":"boom"}"#, Some("Bad Request")), "boom");
        assert_eq!(error_message("plain text", Some("Bad Request")), "plain text");
        assert_eq!(error_message("", Some("Bad Gateway")), "Bad Gateway");
        assert_eq!(error_message("  ", None), "unknown error");
    }
}
