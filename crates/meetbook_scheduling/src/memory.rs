// --- File: crates/meetbook_scheduling/src/memory.rs ---
//! Process-local repository, used when no database is configured and in tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbook_common::CalendarCredential;

use crate::error::SchedulingError;
use crate::models::{Booking, BookingStatus, MeetingType, MeetingTypePatch};
use crate::ports::{BookingFilter, DeleteOutcome, SchedulingRepository, SlotWrite};

#[derive(Default)]
struct MemoryState {
    meeting_types: HashMap<String, MeetingType>,
    bookings: HashMap<String, Booking>,
    credentials: HashMap<String, CalendarCredential>,
}

impl MemoryState {
    fn slot_taken(&self, candidate: &Booking) -> bool {
        let interval = candidate.interval();
        self.bookings.values().any(|b| {
            b.id != candidate.id
                && b.owner_id == candidate.owner_id
                && b.status.is_active()
                && b.interval().overlaps(&interval)
        })
    }
}

/// A single mutex guards all tables, which makes every check-and-write atomic.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, SchedulingError> {
        self.state
            .lock()
            .map_err(|_| SchedulingError::Storage("in-memory store lock poisoned".to_string()))
    }
}

fn sorted_by_creation(mut types: Vec<MeetingType>) -> Vec<MeetingType> {
    types.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    types
}

fn sorted_by_start(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by(|a, b| {
        a.scheduled_time
            .cmp(&b.scheduled_time)
            .then_with(|| a.id.cmp(&b.id))
    });
    bookings
}

#[async_trait]
impl SchedulingRepository for InMemoryRepository {
    async fn get_meeting_type(&self, id: &str) -> Result<Option<MeetingType>, SchedulingError> {
        Ok(self.state()?.meeting_types.get(id).cloned())
    }

    async fn list_meeting_types_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<MeetingType>, SchedulingError> {
        let state = self.state()?;
        Ok(sorted_by_creation(
            state
                .meeting_types
                .values()
                .filter(|mt| mt.owner_id == owner_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_all_meeting_types(&self) -> Result<Vec<MeetingType>, SchedulingError> {
        let state = self.state()?;
        Ok(sorted_by_creation(
            state.meeting_types.values().cloned().collect(),
        ))
    }

    async fn insert_meeting_type(&self, meeting_type: &MeetingType) -> Result<(), SchedulingError> {
        let mut state = self.state()?;
        if state.meeting_types.contains_key(&meeting_type.id) {
            return Err(SchedulingError::Storage(format!(
                "meeting type {} already exists",
                meeting_type.id
            )));
        }
        state
            .meeting_types
            .insert(meeting_type.id.clone(), meeting_type.clone());
        Ok(())
    }

    async fn patch_meeting_type(
        &self,
        id: &str,
        patch: &MeetingTypePatch,
    ) -> Result<Option<MeetingType>, SchedulingError> {
        let mut state = self.state()?;
        Ok(state.meeting_types.get_mut(id).map(|mt| {
            patch.apply_to(mt);
            mt.clone()
        }))
    }

    async fn delete_meeting_type(&self, id: &str) -> Result<DeleteOutcome, SchedulingError> {
        let mut state = self.state()?;
        if !state.meeting_types.contains_key(id) {
            return Ok(DeleteOutcome::Missing);
        }
        let count = state
            .bookings
            .values()
            .filter(|b| b.meeting_type_id == id && b.status.is_active())
            .count();
        if count > 0 {
            return Ok(DeleteOutcome::Blocked { count });
        }
        state.meeting_types.remove(id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, SchedulingError> {
        Ok(self.state()?.bookings.get(id).cloned())
    }

    async fn list_bookings_for_owner(
        &self,
        owner_id: &str,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, SchedulingError> {
        let state = self.state()?;
        Ok(sorted_by_start(
            state
                .bookings
                .values()
                .filter(|b| b.owner_id == owner_id && filter.matches(b.status))
                .cloned()
                .collect(),
        ))
    }

    async fn list_bookings_for_meeting_type(
        &self,
        meeting_type_id: &str,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, SchedulingError> {
        let state = self.state()?;
        Ok(sorted_by_start(
            state
                .bookings
                .values()
                .filter(|b| b.meeting_type_id == meeting_type_id && filter.matches(b.status))
                .cloned()
                .collect(),
        ))
    }

    async fn insert_booking_if_slot_free(
        &self,
        booking: Booking,
    ) -> Result<SlotWrite, SchedulingError> {
        let mut state = self.state()?;
        if state.bookings.contains_key(&booking.id) {
            return Err(SchedulingError::Storage(format!(
                "booking {} already exists",
                booking.id
            )));
        }
        if state.slot_taken(&booking) {
            return Ok(SlotWrite::SlotTaken);
        }
        state.bookings.insert(booking.id.clone(), booking.clone());
        Ok(SlotWrite::Written(booking))
    }

    async fn reactivate_booking_if_slot_free(
        &self,
        booking_id: &str,
    ) -> Result<SlotWrite, SchedulingError> {
        let mut state = self.state()?;
        let Some(booking) = state.bookings.get(booking_id).cloned() else {
            return Err(SchedulingError::not_found("booking", booking_id));
        };
        if state.slot_taken(&booking) {
            return Ok(SlotWrite::SlotTaken);
        }
        let mut restored = booking;
        restored.status = BookingStatus::Scheduled;
        state
            .bookings
            .insert(restored.id.clone(), restored.clone());
        Ok(SlotWrite::Written(restored))
    }

    async fn patch_booking_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> Result<Option<Booking>, SchedulingError> {
        let mut state = self.state()?;
        Ok(state.bookings.get_mut(id).map(|b| {
            b.status = status;
            b.clone()
        }))
    }

    async fn set_calendar_event(
        &self,
        booking_id: &str,
        external_event_id: &str,
        meeting_link: Option<&str>,
    ) -> Result<(), SchedulingError> {
        let mut state = self.state()?;
        let booking = state
            .bookings
            .get_mut(booking_id)
            .ok_or_else(|| SchedulingError::not_found("booking", booking_id))?;
        booking.external_event_id = Some(external_event_id.to_string());
        booking.meeting_link = meeting_link.map(str::to_string);
        Ok(())
    }

    async fn get_calendar_credential(
        &self,
        owner_id: &str,
    ) -> Result<Option<CalendarCredential>, SchedulingError> {
        Ok(self.state()?.credentials.get(owner_id).cloned())
    }

    async fn put_calendar_credential(
        &self,
        owner_id: &str,
        credential: &CalendarCredential,
        _updated_at: DateTime<Utc>,
    ) -> Result<(), SchedulingError> {
        self.state()?
            .credentials
            .insert(owner_id.to_string(), credential.clone());
        Ok(())
    }
}
