//! Error types.
//!
//! Each component has its own `thiserror` enum so callers can match on the
//! failure kind. Everything funnels into [`AppError`] at the application edge,
//! which carries the process exit code.

use thiserror::Error;

/// Raw form input that cannot be turned into a [`crate::domain::LoanRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid numeric value for the {field}.")]
    NonNumericRate { field: &'static str },

    #[error("Invalid maturity date '{input}': expected YYYY-MM-DD.")]
    MalformedDate { input: String },
}

/// Failures talking to the rate service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("rate service unreachable: {0}")]
    Transport(String),

    #[error("rate service returned {status}: {message}")]
    BadStatus { status: u16, message: String },

    #[error("failed to decode rate service response: {0}")]
    Decode(String),
}

/// Failures acquiring or using a chart rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("chart surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("chart has been disposed")]
    Disposed,
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::new(2, err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        Self::new(4, err.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        Self::new(5, err.to_string())
    }
}
