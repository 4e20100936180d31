// --- File: crates/meetbook_scheduling/src/availability.rs ---
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use meetbook_common::CalendarPort;
use meetbook_config::models::{CalendarFailurePolicy, SchedulingConfig};
use tracing::{debug, instrument};

use crate::business_hours::{is_on_grid, GridSettings, SlotGrid};
use crate::busy::{BusyIntervalSet, BusySource};
use crate::clock::Clock;
use crate::error::SchedulingError;
use crate::models::{BlockedReason, MeetingType, Slot, TimeRange};
use crate::ports::SchedulingRepository;

/// Runtime scheduling parameters, resolved from [`SchedulingConfig`].
#[derive(Debug, Clone)]
pub struct SchedulingSettings {
    pub time_zone: Tz,
    pub slot_step: Duration,
    pub max_window: Duration,
    pub calendar_timeout: std::time::Duration,
    pub calendar_failure_policy: CalendarFailurePolicy,
}

impl SchedulingSettings {
    pub fn from_config(config: &SchedulingConfig) -> Result<Self, SchedulingError> {
        let time_zone: Tz = config.time_zone.parse().map_err(|_| {
            SchedulingError::Configuration(format!("unknown time zone '{}'", config.time_zone))
        })?;
        if config.slot_step_minutes == 0 {
            return Err(SchedulingError::Configuration(
                "slot_step_minutes must be positive".to_string(),
            ));
        }
        if config.max_window_days == 0 {
            return Err(SchedulingError::Configuration(
                "max_window_days must be positive".to_string(),
            ));
        }
        Ok(Self {
            time_zone,
            slot_step: Duration::minutes(i64::from(config.slot_step_minutes)),
            max_window: Duration::days(i64::from(config.max_window_days)),
            calendar_timeout: std::time::Duration::from_secs(config.calendar_timeout_secs),
            calendar_failure_policy: config.calendar_failure_policy,
        })
    }

    pub fn grid(&self) -> GridSettings {
        GridSettings {
            time_zone: self.time_zone,
            step: self.slot_step,
        }
    }
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            time_zone: chrono_tz::Asia::Tokyo,
            slot_step: Duration::minutes(30),
            max_window: Duration::days(31),
            calendar_timeout: std::time::Duration::from_secs(10),
            calendar_failure_policy: CalendarFailurePolicy::AssumeFree,
        }
    }
}

/// Annotates candidate slots of a meeting type with their bookability.
#[derive(Clone)]
pub struct AvailabilityResolver {
    repository: Arc<dyn SchedulingRepository>,
    busy: BusySource,
    clock: Arc<dyn Clock>,
    settings: Arc<SchedulingSettings>,
}

impl AvailabilityResolver {
    pub fn new(
        repository: Arc<dyn SchedulingRepository>,
        calendar: Arc<dyn CalendarPort>,
        clock: Arc<dyn Clock>,
        settings: Arc<SchedulingSettings>,
    ) -> Self {
        let busy = BusySource::new(
            repository.clone(),
            calendar,
            settings.calendar_failure_policy,
            settings.calendar_timeout,
        );
        Self {
            repository,
            busy,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &SchedulingSettings {
        &self.settings
    }

    pub(crate) fn busy_source(&self) -> &BusySource {
        &self.busy
    }

    /// All candidate slots of an active meeting type within `[window_start, window_end)`,
    /// ordered by start time.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        meeting_type_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Slot>, SchedulingError> {
        let window = TimeRange::new(window_start, window_end);
        if window.is_empty() {
            return Err(SchedulingError::Validation(
                "window start must be before window end".to_string(),
            ));
        }
        if window.length() > self.settings.max_window {
            return Err(SchedulingError::Validation(format!(
                "window may span at most {} days",
                self.settings.max_window.num_days()
            )));
        }

        let meeting_type = self.active_meeting_type(meeting_type_id).await?;
        self.resolve_for(&meeting_type, window).await
    }

    pub(crate) async fn resolve_for(
        &self,
        meeting_type: &MeetingType,
        window: TimeRange,
    ) -> Result<Vec<Slot>, SchedulingError> {
        let now = self.clock.now();
        let duration = meeting_type.duration();
        let grid = SlotGrid::new(
            &meeting_type.business_hours,
            duration,
            window,
            self.settings.grid(),
            Some(now),
        )?;

        // Slots may run past the window end, so look that far ahead for busy time.
        let busy_window = TimeRange::new(window.start, window.end + duration);
        let busy = self.busy.load(&meeting_type.owner_id, busy_window).await?;

        let slots: Vec<Slot> = grid
            .map(|candidate| classify(candidate, now, &busy, true))
            .collect();
        debug!(
            meeting_type_id = %meeting_type.id,
            slots = slots.len(),
            available = slots.iter().filter(|s| s.available).count(),
            "Resolved availability"
        );
        Ok(slots)
    }

    /// Classifies one arbitrary start time, reporting why it is blocked if it is.
    #[instrument(skip(self))]
    pub async fn probe(
        &self,
        meeting_type_id: &str,
        start: DateTime<Utc>,
    ) -> Result<Slot, SchedulingError> {
        let meeting_type = self.active_meeting_type(meeting_type_id).await?;
        let duration = meeting_type.duration();
        let candidate = TimeRange::new(start, start + duration);

        let in_hours = is_on_grid(
            &meeting_type.business_hours,
            duration,
            start,
            self.settings.grid(),
        )?;
        let busy = self.busy.load(&meeting_type.owner_id, candidate).await?;
        Ok(classify(candidate, self.clock.now(), &busy, in_hours))
    }

    async fn active_meeting_type(&self, id: &str) -> Result<MeetingType, SchedulingError> {
        match self.repository.get_meeting_type(id).await? {
            Some(mt) if mt.is_active => Ok(mt),
            _ => Err(SchedulingError::not_found("meeting type", id)),
        }
    }
}

pub(crate) fn classify(
    candidate: TimeRange,
    now: DateTime<Utc>,
    busy: &BusyIntervalSet,
    in_business_hours: bool,
) -> Slot {
    let blocked_reason = if candidate.start <= now {
        BlockedReason::Past
    } else if busy.overlaps(candidate.start, candidate.end) {
        BlockedReason::OwnerBusy
    } else if !in_business_hours {
        BlockedReason::OutsideBusinessHours
    } else {
        BlockedReason::None
    };
    Slot {
        start: candidate.start,
        end: candidate.end,
        available: blocked_reason == BlockedReason::None,
        blocked_reason,
    }
}
