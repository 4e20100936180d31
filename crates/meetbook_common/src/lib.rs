// --- File: crates/meetbook_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod logging; // Logging utilities
pub mod services; // External service abstractions


// Re-export error types and utilities for easier access
pub use error::{
    config_error, external_service_error, timeout_error, HttpStatusCode, MeetbookError,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, level_from_str, log_result};

// Re-export the calendar port and its value types
pub use services::{
    BusyPeriod, CalendarCredential, CalendarEventRequest, CalendarEventResult, CalendarPort,
    DisabledCalendar,
};

// This crate provides functionality shared by every Meetbook crate: the error model,
// logging setup and the calendar port the scheduling core talks to.
