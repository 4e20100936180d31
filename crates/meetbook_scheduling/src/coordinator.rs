// --- File: crates/meetbook_scheduling/src/coordinator.rs ---
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use meetbook_common::{timeout_error, CalendarEventRequest, CalendarPort};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::availability::AvailabilityResolver;
use crate::clock::Clock;
use crate::error::SchedulingError;
use crate::models::{
    AttendeeInfo, Booking, BookingStatus, Caller, MeetingKind, MeetingType, OwnerBooking,
    TimeRange,
};
use crate::ports::{BookingFilter, SchedulingRepository, SlotWrite};

const MAX_ATTENDEE_NAME_CHARS: usize = 50;

/// A participant's booking submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub attendee_name: String,
    pub attendee_email: String,
    #[serde(default)]
    pub message: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingRequest {
    pub fn attendee(&self) -> AttendeeInfo {
        AttendeeInfo {
            name: self.attendee_name.trim().to_string(),
            email: self.attendee_email.trim().to_string(),
            message: self
                .message
                .as_ref()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        }
    }
}

/// Turns booking requests into persisted bookings without ever double-booking an owner.
pub struct BookingCoordinator {
    repository: Arc<dyn SchedulingRepository>,
    resolver: AvailabilityResolver,
    clock: Arc<dyn Clock>,
}

impl BookingCoordinator {
    pub fn new(
        repository: Arc<dyn SchedulingRepository>,
        resolver: AvailabilityResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            resolver,
            clock,
        }
    }

    fn calendar(&self) -> &Arc<dyn CalendarPort> {
        self.resolver.busy_source().calendar()
    }

    /// Re-checks availability for the requested slot and persists the booking atomically.
    ///
    /// The calendar event is created afterwards on a best-effort basis; a failure
    /// there leaves the booking scheduled but unsynced.
    #[instrument(skip(self, request), fields(start = %request.start))]
    pub async fn submit_booking(
        &self,
        meeting_type_id: &str,
        request: BookingRequest,
    ) -> Result<Booking, SchedulingError> {
        let attendee = request.attendee();
        validate_attendee(&attendee)?;

        let meeting_type = match self.repository.get_meeting_type(meeting_type_id).await? {
            Some(mt) if mt.is_active => mt,
            _ => return Err(SchedulingError::not_found("meeting type", meeting_type_id)),
        };

        let requested = TimeRange::new(request.start, request.end);
        if requested.length() != meeting_type.duration() {
            return Err(SchedulingError::Validation(format!(
                "slot must last exactly {} minutes",
                meeting_type.duration_minutes
            )));
        }

        let slots = self.resolver.resolve_for(&meeting_type, requested).await?;
        let bookable = slots
            .iter()
            .any(|slot| slot.start == requested.start && slot.available);
        if !bookable {
            debug!(meeting_type_id, "Requested slot is not offered as available");
            return Err(SchedulingError::SlotUnavailable);
        }

        let candidate = Booking {
            id: Uuid::new_v4().to_string(),
            meeting_type_id: meeting_type.id.clone(),
            owner_id: meeting_type.owner_id.clone(),
            attendee_name: attendee.name,
            attendee_email: attendee.email,
            message: attendee.message,
            scheduled_time: requested.start,
            end_time: requested.end,
            status: BookingStatus::Scheduled,
            external_event_id: None,
            meeting_link: None,
            created_at: self.clock.now(),
        };

        let booking = match self.repository.insert_booking_if_slot_free(candidate).await? {
            SlotWrite::Written(booking) => booking,
            SlotWrite::SlotTaken => {
                info!(meeting_type_id, "Lost the race for a slot");
                return Err(SchedulingError::SlotUnavailable);
            }
        };
        info!(
            booking_id = %booking.id,
            owner_id = %booking.owner_id,
            "Booking created for {}",
            booking.scheduled_time
        );

        match self.create_calendar_event(&meeting_type, &booking).await {
            Ok(synced) => Ok(synced),
            Err(err) => {
                warn!(
                    booking_id = %booking.id,
                    owner_id = %booking.owner_id,
                    error = %err,
                    "Calendar event creation failed, booking left unsynced"
                );
                Ok(booking)
            }
        }
    }

    /// Moves a booking along its lifecycle. Cancelled → scheduled goes through [`Self::restore`].
    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn update_status(
        &self,
        booking_id: &str,
        new_status: BookingStatus,
        caller: &Caller,
    ) -> Result<Booking, SchedulingError> {
        let booking = self.owned_booking(booking_id, caller).await?;
        let current = booking.status;

        if current == new_status {
            return Ok(booking);
        }
        if !current.can_transition_to(new_status) {
            return Err(SchedulingError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }

        match new_status {
            BookingStatus::Scheduled => self.reactivate(booking).await,
            BookingStatus::Completed if self.clock.now() < booking.scheduled_time => {
                Err(SchedulingError::Validation(
                    "a booking can only be completed after it has started".to_string(),
                ))
            }
            _ => {
                let updated = self
                    .repository
                    .patch_booking_status(booking_id, new_status)
                    .await?
                    .ok_or_else(|| SchedulingError::not_found("booking", booking_id))?;
                info!(booking_id, from = %current, to = %new_status, "Booking status changed");
                Ok(updated)
            }
        }
    }

    /// Re-activates a cancelled booking if its interval is still free.
    pub async fn restore(
        &self,
        booking_id: &str,
        caller: &Caller,
    ) -> Result<Booking, SchedulingError> {
        let booking = self.owned_booking(booking_id, caller).await?;
        match booking.status {
            BookingStatus::Cancelled => self.reactivate(booking).await,
            BookingStatus::Scheduled => Ok(booking),
            BookingStatus::Completed => Err(SchedulingError::InvalidTransition {
                from: BookingStatus::Completed,
                to: BookingStatus::Scheduled,
            }),
        }
    }

    async fn reactivate(&self, booking: Booking) -> Result<Booking, SchedulingError> {
        // A synced booking's own event is still on the owner's calendar.
        let own_event = booking.calendar_synced().then_some(booking.interval());
        let busy = self
            .resolver
            .busy_source()
            .load_excluding(&booking.owner_id, booking.interval(), own_event)
            .await?;
        if busy.overlaps(booking.scheduled_time, booking.end_time) {
            return Err(SchedulingError::SlotUnavailable);
        }

        match self
            .repository
            .reactivate_booking_if_slot_free(&booking.id)
            .await?
        {
            SlotWrite::Written(restored) => {
                info!(booking_id = %restored.id, "Booking restored");
                Ok(restored)
            }
            SlotWrite::SlotTaken => Err(SchedulingError::SlotUnavailable),
        }
    }

    pub async fn get(&self, booking_id: &str, caller: &Caller) -> Result<Booking, SchedulingError> {
        self.owned_booking(booking_id, caller).await
    }

    /// All of the caller's bookings with their meeting details, latest slot first.
    pub async fn list_for_owner(
        &self,
        caller: &Caller,
    ) -> Result<Vec<OwnerBooking>, SchedulingError> {
        let bookings = self
            .repository
            .list_bookings_for_owner(&caller.user_id, BookingFilter::All)
            .await?;

        let mut meeting_types: HashMap<String, Option<MeetingType>> = HashMap::new();
        let mut rows = Vec::with_capacity(bookings.len());
        for booking in bookings {
            if !meeting_types.contains_key(&booking.meeting_type_id) {
                let mt = self
                    .repository
                    .get_meeting_type(&booking.meeting_type_id)
                    .await?;
                meeting_types.insert(booking.meeting_type_id.clone(), mt);
            }
            let mt = meeting_types
                .get(&booking.meeting_type_id)
                .and_then(|mt| mt.as_ref());
            rows.push(OwnerBooking {
                calendar_synced: booking.calendar_synced(),
                meeting_title: mt.map(|m| m.title.clone()),
                meeting_duration_minutes: mt.map(|m| m.duration_minutes),
                meeting_kind: mt.map(|m| m.meeting_kind),
                booking,
            });
        }
        rows.sort_by(|a, b| b.booking.scheduled_time.cmp(&a.booking.scheduled_time));
        Ok(rows)
    }

    /// Retries calendar event creation for a scheduled booking that has none yet.
    pub async fn resync_calendar_event(
        &self,
        booking_id: &str,
        caller: &Caller,
    ) -> Result<Booking, SchedulingError> {
        let booking = self.owned_booking(booking_id, caller).await?;
        if booking.calendar_synced() {
            return Ok(booking);
        }
        if booking.status != BookingStatus::Scheduled {
            return Err(SchedulingError::Validation(format!(
                "only scheduled bookings can be synced, this one is {}",
                booking.status
            )));
        }
        let meeting_type = self
            .repository
            .get_meeting_type(&booking.meeting_type_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("meeting type", &booking.meeting_type_id))?;

        let synced = self.create_calendar_event(&meeting_type, &booking).await?;
        if !synced.calendar_synced() {
            return Err(SchedulingError::Validation(
                "owner has no calendar linked".to_string(),
            ));
        }
        Ok(synced)
    }

    /// Creates the owner's calendar event and records its id. Returns the booking
    /// unchanged when the owner has no calendar linked.
    async fn create_calendar_event(
        &self,
        meeting_type: &MeetingType,
        booking: &Booking,
    ) -> Result<Booking, SchedulingError> {
        let Some(credential) = self
            .repository
            .get_calendar_credential(&booking.owner_id)
            .await?
        else {
            debug!(owner_id = %booking.owner_id, "No calendar linked, skipping event creation");
            return Ok(booking.clone());
        };

        let timeout = self.resolver.settings().calendar_timeout;
        let event = calendar_event_for(meeting_type, booking);
        let result = tokio::time::timeout(timeout, self.calendar().create_event(&credential, event))
            .await
            .unwrap_or_else(|_| Err(timeout_error(format!("event creation exceeded {timeout:?}"))))?;

        self.repository
            .set_calendar_event(&booking.id, &result.event_id, result.join_url.as_deref())
            .await?;
        info!(
            booking_id = %booking.id,
            event_id = %result.event_id,
            "Calendar event created"
        );

        let mut synced = booking.clone();
        synced.external_event_id = Some(result.event_id);
        synced.meeting_link = result.join_url;
        Ok(synced)
    }

    async fn owned_booking(
        &self,
        booking_id: &str,
        caller: &Caller,
    ) -> Result<Booking, SchedulingError> {
        let booking = self
            .repository
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("booking", booking_id))?;
        if booking.owner_id != caller.user_id {
            return Err(SchedulingError::Forbidden(
                "only the meeting owner can manage this booking".to_string(),
            ));
        }
        Ok(booking)
    }
}

/// Event posted to the owner's calendar for a booking.
pub fn calendar_event_for(meeting_type: &MeetingType, booking: &Booking) -> CalendarEventRequest {
    let mut lines = vec![
        format!("Meeting type: {}", meeting_type.title),
        format!(
            "Attendee: {} ({})",
            booking.attendee_name, booking.attendee_email
        ),
    ];
    if let Some(description) = meeting_type.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Description: {description}"));
    }
    if let Some(message) = booking.message.as_deref().filter(|m| !m.is_empty()) {
        lines.push(format!("Message: {message}"));
    }
    lines.push(String::new());
    lines.push(format!("Booking ID: {}", booking.id));

    CalendarEventRequest {
        summary: format!("{} - {}", meeting_type.title, booking.attendee_name),
        description: lines.join("\n"),
        start: booking.scheduled_time,
        end: booking.end_time,
        attendee_email: booking.attendee_email.clone(),
        request_conference: meeting_type.meeting_kind == MeetingKind::GoogleMeet,
    }
}

pub fn validate_attendee(attendee: &AttendeeInfo) -> Result<(), SchedulingError> {
    let name_len = attendee.name.chars().count();
    if name_len == 0 || name_len > MAX_ATTENDEE_NAME_CHARS {
        return Err(SchedulingError::Validation(format!(
            "attendee name must be 1 to {MAX_ATTENDEE_NAME_CHARS} characters"
        )));
    }
    if !is_plausible_email(&attendee.email) {
        return Err(SchedulingError::Validation(format!(
            "invalid email address '{}'",
            attendee.email
        )));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
