// --- File: crates/meetbook_scheduling/src/registry.rs ---
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::business_hours::validate_business_hours;
use crate::clock::Clock;
use crate::error::SchedulingError;
use crate::models::{Caller, MeetingType, MeetingTypePatch, NewMeetingType};
use crate::ports::{BookingFilter, DeleteOutcome, SchedulingRepository};

const MAX_TITLE_CHARS: usize = 100;
const MIN_DURATION_MINUTES: u32 = 15;
const MAX_DURATION_MINUTES: u32 = 240;

/// Lifecycle of meeting types: creation, edits, activation and guarded deletion.
pub struct MeetingTypeRegistry {
    repository: Arc<dyn SchedulingRepository>,
    clock: Arc<dyn Clock>,
}

impl MeetingTypeRegistry {
    pub fn new(repository: Arc<dyn SchedulingRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    #[instrument(skip(self, input), fields(owner_id = %caller.user_id))]
    pub async fn create(
        &self,
        caller: &Caller,
        input: NewMeetingType,
    ) -> Result<MeetingType, SchedulingError> {
        if !caller.can_own_meetings() {
            return Err(SchedulingError::Forbidden(
                "only owners can create meeting types".to_string(),
            ));
        }
        let title = input.title.trim().to_string();
        validate_title(&title)?;
        validate_duration(input.duration_minutes)?;
        validate_business_hours(&input.business_hours)?;

        let meeting_type = MeetingType {
            id: Uuid::new_v4().to_string(),
            owner_id: caller.user_id.clone(),
            title,
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            duration_minutes: input.duration_minutes,
            meeting_kind: input.meeting_kind,
            business_hours: input.business_hours,
            is_active: true,
            created_at: self.clock.now(),
        };
        self.repository.insert_meeting_type(&meeting_type).await?;
        info!(meeting_type_id = %meeting_type.id, "Meeting type created");
        Ok(meeting_type)
    }

    /// An active meeting type, as shown on the public booking page.
    pub async fn get_public(&self, id: &str) -> Result<MeetingType, SchedulingError> {
        match self.repository.get_meeting_type(id).await? {
            Some(mt) if mt.is_active => Ok(mt),
            _ => Err(SchedulingError::not_found("meeting type", id)),
        }
    }

    pub async fn list_for_owner(
        &self,
        caller: &Caller,
    ) -> Result<Vec<MeetingType>, SchedulingError> {
        let mut types = self
            .repository
            .list_meeting_types_for_owner(&caller.user_id)
            .await?;
        types.retain(|mt| mt.is_active);
        Ok(types)
    }

    pub async fn list_all(&self, caller: &Caller) -> Result<Vec<MeetingType>, SchedulingError> {
        if !caller.is_admin() {
            return Err(SchedulingError::Forbidden(
                "only administrators can list every meeting type".to_string(),
            ));
        }
        self.repository.list_all_meeting_types().await
    }

    /// Applies a field patch. The owner or an admin may edit; only admins may toggle activation.
    #[instrument(skip(self, patch, caller))]
    pub async fn update(
        &self,
        id: &str,
        patch: MeetingTypePatch,
        caller: &Caller,
    ) -> Result<MeetingType, SchedulingError> {
        let existing = self.load(id).await?;
        if existing.owner_id != caller.user_id && !caller.is_admin() {
            return Err(SchedulingError::Forbidden(
                "only the owner can edit this meeting type".to_string(),
            ));
        }
        if patch.is_active.is_some() && !caller.is_admin() {
            return Err(SchedulingError::Forbidden(
                "only administrators can change activation".to_string(),
            ));
        }

        let mut patch = patch;
        if let Some(title) = patch.title.as_mut() {
            *title = title.trim().to_string();
            validate_title(title)?;
        }
        if let Some(description) = patch.description.as_mut() {
            *description = description.trim().to_string();
        }
        if let Some(duration) = patch.duration_minutes {
            validate_duration(duration)?;
        }
        if let Some(hours) = &patch.business_hours {
            validate_business_hours(hours)?;
        }
        if patch.is_empty() {
            return Ok(existing);
        }

        let updated = self
            .repository
            .patch_meeting_type(id, &patch)
            .await?
            .ok_or_else(|| SchedulingError::not_found("meeting type", id))?;
        info!(meeting_type_id = id, "Meeting type updated");
        Ok(updated)
    }

    /// Admin-only activation toggle. Existing bookings are unaffected.
    pub async fn set_active(
        &self,
        id: &str,
        is_active: bool,
        caller: &Caller,
    ) -> Result<MeetingType, SchedulingError> {
        if !caller.is_admin() {
            return Err(SchedulingError::Forbidden(
                "only administrators can change activation".to_string(),
            ));
        }
        let patch = MeetingTypePatch {
            is_active: Some(is_active),
            ..MeetingTypePatch::default()
        };
        let updated = self
            .repository
            .patch_meeting_type(id, &patch)
            .await?
            .ok_or_else(|| SchedulingError::not_found("meeting type", id))?;
        info!(meeting_type_id = id, is_active, "Meeting type activation changed");
        Ok(updated)
    }

    /// Deletes a meeting type that no longer has scheduled or completed bookings.
    pub async fn delete(&self, id: &str, caller: &Caller) -> Result<(), SchedulingError> {
        let existing = self.load(id).await?;
        if existing.owner_id != caller.user_id {
            return Err(SchedulingError::Forbidden(
                "only the owner can delete this meeting type".to_string(),
            ));
        }
        let count = self.count_active(id).await?;
        if count > 0 {
            return Err(SchedulingError::Conflict { count });
        }

        // The repository re-checks inside its own critical section.
        match self.repository.delete_meeting_type(id).await? {
            DeleteOutcome::Deleted => {
                info!(meeting_type_id = id, "Meeting type deleted");
                Ok(())
            }
            DeleteOutcome::Blocked { count } => Err(SchedulingError::Conflict { count }),
            DeleteOutcome::Missing => Err(SchedulingError::not_found("meeting type", id)),
        }
    }

    /// Number of non-cancelled bookings of a meeting type.
    pub async fn active_booking_count(
        &self,
        id: &str,
        caller: &Caller,
    ) -> Result<usize, SchedulingError> {
        let existing = self.load(id).await?;
        if existing.owner_id != caller.user_id && !caller.is_admin() {
            return Err(SchedulingError::Forbidden(
                "only the owner can see booking counts".to_string(),
            ));
        }
        self.count_active(id).await
    }

    async fn count_active(&self, id: &str) -> Result<usize, SchedulingError> {
        Ok(self
            .repository
            .list_bookings_for_meeting_type(id, BookingFilter::Active)
            .await?
            .len())
    }

    async fn load(&self, id: &str) -> Result<MeetingType, SchedulingError> {
        self.repository
            .get_meeting_type(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("meeting type", id))
    }
}

fn validate_title(title: &str) -> Result<(), SchedulingError> {
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_CHARS {
        return Err(SchedulingError::Validation(format!(
            "title must be 1 to {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_duration(minutes: u32) -> Result<(), SchedulingError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(SchedulingError::Validation(format!(
            "duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes"
        )));
    }
    Ok(())
}
