// --- File: crates/meetbook_scheduling/src/busy.rs ---
use std::sync::Arc;

use chrono::{DateTime, Utc};
use meetbook_common::{timeout_error, CalendarPort};
use meetbook_config::models::CalendarFailurePolicy;
use tracing::{debug, warn};

use crate::error::SchedulingError;
use crate::models::TimeRange;
use crate::ports::{BookingFilter, SchedulingRepository};

/// Sorted, merged set of intervals during which an owner is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyIntervalSet {
    intervals: Vec<TimeRange>,
}

impl BusyIntervalSet {
    /// Drops empty ranges, sorts by start and merges overlapping or touching ranges.
    pub fn new(intervals: impl IntoIterator<Item = TimeRange>) -> Self {
        let mut sorted: Vec<TimeRange> = intervals.into_iter().filter(|r| !r.is_empty()).collect();
        sorted.sort_by_key(|r| r.start);

        let mut merged: Vec<TimeRange> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => {
                    if range.end > last.end {
                        last.end = range.end;
                    }
                }
                _ => merged.push(range),
            }
        }
        Self { intervals: merged }
    }

    /// Half-open overlap: touching endpoints do not count.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if end <= start {
            return false;
        }
        let idx = self.intervals.partition_point(|r| r.end <= start);
        self.intervals.get(idx).is_some_and(|r| r.start < end)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeRange> {
        self.intervals.iter()
    }
}

/// Gathers an owner's busy time from the external calendar and from stored bookings.
#[derive(Clone)]
pub struct BusySource {
    repository: Arc<dyn SchedulingRepository>,
    calendar: Arc<dyn CalendarPort>,
    failure_policy: CalendarFailurePolicy,
    calendar_timeout: std::time::Duration,
}

impl BusySource {
    pub fn new(
        repository: Arc<dyn SchedulingRepository>,
        calendar: Arc<dyn CalendarPort>,
        failure_policy: CalendarFailurePolicy,
        calendar_timeout: std::time::Duration,
    ) -> Self {
        Self {
            repository,
            calendar,
            failure_policy,
            calendar_timeout,
        }
    }

    pub fn calendar(&self) -> &Arc<dyn CalendarPort> {
        &self.calendar
    }

    pub async fn load(
        &self,
        owner_id: &str,
        window: TimeRange,
    ) -> Result<BusyIntervalSet, SchedulingError> {
        self.load_excluding(owner_id, window, None).await
    }

    /// Like [`Self::load`], but drops calendar busy periods that exactly match `own_event`.
    ///
    /// Used when restoring a booking whose calendar event is still on the owner's calendar.
    /// Anything else on the calendar that overlaps the slot still counts.
    pub async fn load_excluding(
        &self,
        owner_id: &str,
        window: TimeRange,
        own_event: Option<TimeRange>,
    ) -> Result<BusyIntervalSet, SchedulingError> {
        let mut intervals = self.external_busy(owner_id, window).await?;
        if let Some(own) = own_event {
            intervals.retain(|r| *r != own);
        }

        let bookings = self
            .repository
            .list_bookings_for_owner(owner_id, BookingFilter::Active)
            .await?;
        intervals.extend(
            bookings
                .iter()
                .map(|b| b.interval())
                .filter(|r| r.overlaps(&window)),
        );

        let set = BusyIntervalSet::new(intervals);
        debug!(
            owner_id,
            busy_intervals = set.len(),
            "Loaded busy intervals for {} .. {}",
            window.start,
            window.end
        );
        Ok(set)
    }

    async fn external_busy(
        &self,
        owner_id: &str,
        window: TimeRange,
    ) -> Result<Vec<TimeRange>, SchedulingError> {
        let Some(credential) = self.repository.get_calendar_credential(owner_id).await? else {
            debug!(owner_id, "No calendar linked, using stored bookings only");
            return Ok(Vec::new());
        };

        let outcome = tokio::time::timeout(
            self.calendar_timeout,
            self.calendar
                .list_busy_intervals(&credential, window.start, window.end),
        )
        .await
        .unwrap_or_else(|_| {
            Err(timeout_error(&format!(
                "busy lookup exceeded {:?}",
                self.calendar_timeout
            )))
        });

        match outcome {
            Ok(periods) => Ok(periods
                .into_iter()
                .map(|p| TimeRange::new(p.start, p.end))
                .collect()),
            Err(err) => match self.failure_policy {
                CalendarFailurePolicy::AssumeFree => {
                    warn!(owner_id, error = %err, "Calendar lookup failed, treating owner as free");
                    Ok(Vec::new())
                }
                CalendarFailurePolicy::BlockAll => {
                    warn!(owner_id, error = %err, "Calendar lookup failed, blocking the whole window");
                    Ok(vec![window])
                }
                CalendarFailurePolicy::Fail => Err(SchedulingError::ExternalService(err)),
            },
        }
    }
}
