// --- File: crates/meetbook_gcal/src/lib.rs ---
pub mod auth;
pub mod convert;
pub mod error;
pub mod service;

#[cfg(test)]
mod convert_test;

pub use error::GcalError;
pub use service::GoogleCalendarPort;
