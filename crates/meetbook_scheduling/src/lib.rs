// --- File: crates/meetbook_scheduling/src/lib.rs ---
pub mod availability;
pub mod business_hours;
#[cfg(test)]
mod business_hours_proptest;
#[cfg(test)]
mod business_hours_test;
pub mod busy;
pub mod clock;
pub mod coordinator;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod ports;
pub mod registry;
pub mod routes;
#[cfg(test)]
mod test_support;

pub use availability::{AvailabilityResolver, SchedulingSettings};
pub use busy::BusyIntervalSet;
pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{BookingCoordinator, BookingRequest};
pub use error::SchedulingError;
pub use handlers::SchedulingState;
pub use memory::InMemoryRepository;
pub use ports::{BookingFilter, DeleteOutcome, SchedulingRepository, SlotWrite};
pub use registry::MeetingTypeRegistry;
