//! Service abstractions for external services.
//!
//! The scheduling core never talks to a calendar provider directly. It consumes the
//! [`CalendarPort`] trait defined here, which the composition root satisfies with a
//! provider implementation (Google Calendar in `meetbook-gcal`) or [`DisabledCalendar`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MeetbookError;

/// An occupied period reported by an external calendar. Half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The handle through which the core acts on an owner's calendar.
///
/// Issued by the identity layer; the core treats it as opaque apart from passing it
/// back to the port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCredential {
    /// Calendar to read and write, e.g. "primary".
    pub calendar_id: String,
    /// Delegated OAuth access token, when the owner signed in with the provider.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

/// Data for an event the core wants created on the owner's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventRequest {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendee_email: String,
    /// Ask the provider to attach a video conference to the event.
    pub request_conference: bool,
}

/// Represents the result of a calendar event creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventResult {
    /// The provider's ID of the event.
    pub event_id: String,
    /// Conference join URL, when one was created.
    pub join_url: Option<String>,
}

/// A trait for calendar provider operations consumed by the scheduling core.
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// Get busy time intervals within `[window_start, window_end)`, sorted by start.
    async fn list_busy_intervals(
        &self,
        credential: &CalendarCredential,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyPeriod>, MeetbookError>;

    /// Create a calendar event and return its provider ID.
    async fn create_event(
        &self,
        credential: &CalendarCredential,
        event: CalendarEventRequest,
    ) -> Result<CalendarEventResult, MeetbookError>;
}

/// Calendar port used when no provider is configured.
///
/// Reports no busy periods and refuses to create events, so bookings stay unsynced.
#[derive(Debug, Clone, Default)]
pub struct DisabledCalendar;

#[async_trait]
impl CalendarPort for DisabledCalendar {
    async fn list_busy_intervals(
        &self,
        _credential: &CalendarCredential,
        _window_start: DateTime<Utc>,
        _window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyPeriod>, MeetbookError> {
        Ok(Vec::new())
    }

    async fn create_event(
        &self,
        _credential: &CalendarCredential,
        _event: CalendarEventRequest,
    ) -> Result<CalendarEventResult, MeetbookError> {
        Err(MeetbookError::ExternalServiceError {
            service_name: "calendar".to_string(),
            message: "calendar integration is disabled".to_string(),
        })
    }
}
