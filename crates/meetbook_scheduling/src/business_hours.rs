// --- File: crates/meetbook_scheduling/src/business_hours.rs ---
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::SchedulingError;
use crate::models::{BusinessHours, TimeRange};

/// Parses a zero-padded 24h "HH:MM" value.
pub fn parse_clock(value: &str) -> Result<NaiveTime, SchedulingError> {
    let malformed = || SchedulingError::Configuration(format!("invalid time of day '{value}'"));
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(malformed());
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u32> {
        let part = &value[range];
        if part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse().ok()
        } else {
            None
        }
    };
    let hour = digits(0..2).ok_or_else(malformed)?;
    let minute = digits(3..5).ok_or_else(malformed)?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(malformed)
}

/// Validates submitted business hours: every enabled day parses and opens before it closes.
///
/// Malformed times are a `Validation` error here. The slot grid reports the same
/// problem in stored data as `Configuration`.
pub fn validate_business_hours(hours: &BusinessHours) -> Result<(), SchedulingError> {
    for (weekday, day) in hours.iter() {
        if !day.enabled {
            continue;
        }
        let parse = |value: &str| {
            parse_clock(value).map_err(|_| {
                SchedulingError::Validation(format!(
                    "{weekday}: invalid time of day '{value}', expected HH:MM"
                ))
            })
        };
        let open = parse(&day.start_time)?;
        let close = parse(&day.end_time)?;
        if open >= close {
            return Err(SchedulingError::Validation(format!(
                "{weekday}: start time {} must be before end time {}",
                day.start_time, day.end_time
            )));
        }
    }
    Ok(())
}

/// Parameters of a grid walk that do not depend on the meeting type.
#[derive(Debug, Clone, Copy)]
pub struct GridSettings {
    pub time_zone: Tz,
    pub step: Duration,
}

/// Lazily enumerates candidate slots of one meeting type over a window.
///
/// Each enabled day is walked from its opening time in `step` increments; a
/// candidate is kept when it ends no later than closing time, starts inside
/// `[window_start, window_end)` and starts strictly after `now`. Clone the grid
/// before consuming it to walk it again.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    days: [Option<(NaiveTime, NaiveTime)>; 7],
    duration: Duration,
    step: Duration,
    time_zone: Tz,
    window: TimeRange,
    not_after: Option<DateTime<Utc>>,
    current: NaiveDate,
    last: NaiveDate,
    offset: Duration,
}

impl SlotGrid {
    /// Builds the grid. Malformed times on enabled days fail here, before any slot is produced.
    pub fn new(
        hours: &BusinessHours,
        duration: Duration,
        window: TimeRange,
        settings: GridSettings,
        now: Option<DateTime<Utc>>,
    ) -> Result<Self, SchedulingError> {
        if duration <= Duration::zero() {
            return Err(SchedulingError::Configuration(
                "slot duration must be positive".to_string(),
            ));
        }
        if settings.step <= Duration::zero() {
            return Err(SchedulingError::Configuration(
                "slot step must be positive".to_string(),
            ));
        }

        let mut days = [None; 7];
        for (weekday, day) in hours.iter() {
            if day.enabled {
                let open = parse_clock(&day.start_time)?;
                let close = parse_clock(&day.end_time)?;
                days[weekday.num_days_from_monday() as usize] = Some((open, close));
            }
        }

        let first = window.start.with_timezone(&settings.time_zone).date_naive();
        let last = window.end.with_timezone(&settings.time_zone).date_naive();

        Ok(Self {
            days,
            duration,
            step: settings.step,
            time_zone: settings.time_zone,
            window,
            not_after: now,
            current: first,
            last,
            offset: Duration::zero(),
        })
    }

    fn next_day(&mut self) -> bool {
        match self.current.succ_opt() {
            Some(next) => {
                self.current = next;
                self.offset = Duration::zero();
                true
            }
            None => false,
        }
    }

    fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        // Gaps yield nothing; folds take the earlier instant.
        self.time_zone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl Iterator for SlotGrid {
    type Item = TimeRange;

    fn next(&mut self) -> Option<TimeRange> {
        loop {
            if self.current > self.last || self.window.is_empty() {
                return None;
            }

            let Some((open, close)) =
                self.days[self.current.weekday().num_days_from_monday() as usize]
            else {
                if !self.next_day() {
                    return None;
                }
                continue;
            };

            let local_start = self.current.and_time(open) + self.offset;
            let local_end = local_start + self.duration;
            if local_end > self.current.and_time(close) {
                if !self.next_day() {
                    return None;
                }
                continue;
            }
            self.offset = self.offset + self.step;

            let Some(start) = self.to_utc(local_start) else {
                continue;
            };
            if start >= self.window.end {
                // Later candidates on later days only move further out.
                self.current = self.last;
                if !self.next_day() {
                    return None;
                }
                continue;
            }
            if start < self.window.start {
                continue;
            }
            if self.not_after.is_some_and(|now| start <= now) {
                continue;
            }
            return Some(TimeRange::new(start, start + self.duration));
        }
    }
}

/// Whether `start` lands exactly on a grid slot of `hours`, ignoring the past rule.
pub fn is_on_grid(
    hours: &BusinessHours,
    duration: Duration,
    start: DateTime<Utc>,
    settings: GridSettings,
) -> Result<bool, SchedulingError> {
    let window = TimeRange::new(start, start + Duration::seconds(1));
    let mut grid = SlotGrid::new(hours, duration, window, settings, None)?;
    Ok(grid.any(|slot| slot.start == start))
}
