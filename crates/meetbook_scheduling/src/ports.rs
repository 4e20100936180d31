// --- File: crates/meetbook_scheduling/src/ports.rs ---
//! Storage seam of the scheduling core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbook_common::CalendarCredential;

use crate::error::SchedulingError;
use crate::models::{Booking, BookingStatus, MeetingType, MeetingTypePatch};

/// Which bookings a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFilter {
    All,
    /// Everything except cancelled bookings.
    Active,
    Status(BookingStatus),
}

impl BookingFilter {
    pub fn matches(&self, status: BookingStatus) -> bool {
        match self {
            BookingFilter::All => true,
            BookingFilter::Active => status.is_active(),
            BookingFilter::Status(wanted) => *wanted == status,
        }
    }
}

/// Result of an atomic check-and-write on an owner's timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotWrite {
    Written(Booking),
    /// Another non-cancelled booking of the same owner overlaps the interval.
    SlotTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Missing,
    /// Non-cancelled bookings still reference the meeting type.
    Blocked { count: usize },
}

/// Persistent store for meeting types, bookings and owner calendar credentials.
///
/// `insert_booking_if_slot_free` and `reactivate_booking_if_slot_free` must be
/// atomic with respect to each other for a given owner: two concurrent calls
/// for overlapping intervals never both succeed.
#[async_trait]
pub trait SchedulingRepository: Send + Sync {
    async fn get_meeting_type(&self, id: &str) -> Result<Option<MeetingType>, SchedulingError>;

    async fn list_meeting_types_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<MeetingType>, SchedulingError>;

    async fn list_all_meeting_types(&self) -> Result<Vec<MeetingType>, SchedulingError>;

    async fn insert_meeting_type(&self, meeting_type: &MeetingType) -> Result<(), SchedulingError>;

    async fn patch_meeting_type(
        &self,
        id: &str,
        patch: &MeetingTypePatch,
    ) -> Result<Option<MeetingType>, SchedulingError>;

    /// Deletes unless non-cancelled bookings reference the meeting type.
    async fn delete_meeting_type(&self, id: &str) -> Result<DeleteOutcome, SchedulingError>;

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, SchedulingError>;

    async fn list_bookings_for_owner(
        &self,
        owner_id: &str,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, SchedulingError>;

    async fn list_bookings_for_meeting_type(
        &self,
        meeting_type_id: &str,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, SchedulingError>;

    /// Inserts `booking` only if no non-cancelled booking of the same owner overlaps it.
    async fn insert_booking_if_slot_free(
        &self,
        booking: Booking,
    ) -> Result<SlotWrite, SchedulingError>;

    /// Flips a cancelled booking back to scheduled under the same overlap check.
    async fn reactivate_booking_if_slot_free(
        &self,
        booking_id: &str,
    ) -> Result<SlotWrite, SchedulingError>;

    async fn patch_booking_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> Result<Option<Booking>, SchedulingError>;

    async fn set_calendar_event(
        &self,
        booking_id: &str,
        external_event_id: &str,
        meeting_link: Option<&str>,
    ) -> Result<(), SchedulingError>;

    async fn get_calendar_credential(
        &self,
        owner_id: &str,
    ) -> Result<Option<CalendarCredential>, SchedulingError>;

    /// Stores or replaces the owner's credential, stamped with `updated_at`.
    async fn put_calendar_credential(
        &self,
        owner_id: &str,
        credential: &CalendarCredential,
        updated_at: DateTime<Utc>,
    ) -> Result<(), SchedulingError>;

    /// Cheap liveness probe of the underlying store.
    async fn health_check(&self) -> Result<(), SchedulingError> {
        Ok(())
    }
}
