// --- File: crates/meetbook_scheduling/src/error.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use meetbook_common::{HttpStatusCode, MeetbookError};
use serde_json::json;
use thiserror::Error;

use crate::models::BookingStatus;

/// Errors surfaced by the scheduling core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Meeting type still has {count} active booking(s)")]
    Conflict { count: usize },

    #[error("The requested slot is no longer available")]
    SlotUnavailable,

    #[error("Cannot move a booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    ExternalService(#[from] MeetbookError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl SchedulingError {
    /// Stable machine-readable name used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            SchedulingError::NotFound(_) => "not_found",
            SchedulingError::Forbidden(_) => "forbidden",
            SchedulingError::Conflict { .. } => "conflict",
            SchedulingError::SlotUnavailable => "slot_unavailable",
            SchedulingError::InvalidTransition { .. } => "invalid_transition",
            SchedulingError::Configuration(_) => "configuration",
            SchedulingError::ExternalService(_) => "external_service",
            SchedulingError::Validation(_) => "validation",
            SchedulingError::Storage(_) => "storage",
        }
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        SchedulingError::NotFound(format!("{what} {id}"))
    }
}

impl HttpStatusCode for SchedulingError {
    fn status_code(&self) -> u16 {
        match self {
            SchedulingError::NotFound(_) => 404,
            SchedulingError::Forbidden(_) => 403,
            SchedulingError::Conflict { .. } => 409,
            SchedulingError::SlotUnavailable => 409,
            SchedulingError::InvalidTransition { .. } => 409,
            SchedulingError::Configuration(_) => 500,
            SchedulingError::ExternalService(_) => 502,
            SchedulingError::Validation(_) => 400,
            SchedulingError::Storage(_) => 500,
        }
    }
}

impl IntoResponse for SchedulingError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        if let SchedulingError::Conflict { count } = &self {
            body["error"]["count"] = json!(count);
        }
        (status, Json(body)).into_response()
    }
}
