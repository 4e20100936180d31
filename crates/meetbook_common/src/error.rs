use thiserror::Error;

/// The base error type for cross-cutting Meetbook failures.
///
/// Domain crates keep their own error enums and convert into or out of this one at
/// their boundaries. The calendar port reports every failure through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeetbookError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The external credential was rejected or is missing
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// Implemented by every error type that can reach an HTTP handler so the
/// status mapping lives next to the error definition.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for MeetbookError {
    fn status_code(&self) -> u16 {
        match self {
            MeetbookError::ParseError(_) => 400,
            MeetbookError::ConfigError(_) => 500,
            MeetbookError::AuthError(_) => 401,
            MeetbookError::DatabaseError(_) => 500,
            MeetbookError::ExternalServiceError { .. } => 502,
            MeetbookError::TimeoutError(_) => 504,
            MeetbookError::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for MeetbookError {
    fn from(err: serde_json::Error) -> Self {
        MeetbookError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for MeetbookError {
    fn from(err: std::io::Error) -> Self {
        MeetbookError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: std::fmt::Display>(message: T) -> MeetbookError {
    MeetbookError::ConfigError(message.to_string())
}

pub fn external_service_error<T: std::fmt::Display>(service_name: &str, message: T) -> MeetbookError {
    MeetbookError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn timeout_error<T: std::fmt::Display>(message: T) -> MeetbookError {
    MeetbookError::TimeoutError(message.to_string())
}

