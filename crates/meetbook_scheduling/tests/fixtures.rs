//! Test fixtures for scheduling integration tests
//!
//! Builders for meeting types and requests plus a recording calendar double.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};
use chrono_tz::Asia::Tokyo;
use meetbook_common::{
    external_service_error, BusyPeriod, CalendarCredential, CalendarEventRequest,
    CalendarEventResult, CalendarPort, MeetbookError,
};
use meetbook_scheduling::models::{BusinessHours, Caller, MeetingKind, NewMeetingType, Role};
use meetbook_scheduling::{
    BookingRequest, FixedClock, InMemoryRepository, SchedulingRepository, SchedulingSettings,
    SchedulingState,
};

pub const OWNER: &str = "owner-1";

pub fn tokyo(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Tokyo
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Monday 2025-06-02, the day most scenarios book into.
pub fn monday_at(h: u32, min: u32) -> DateTime<Utc> {
    tokyo(2025, 6, 2, h, min)
}

pub fn owner() -> Caller {
    Caller::new(OWNER, Role::Owner)
}

pub fn admin() -> Caller {
    Caller::new("admin-1", Role::Admin)
}

pub fn weekday_hours() -> BusinessHours {
    BusinessHours::uniform(
        &[
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ],
        "09:00",
        "17:00",
    )
}

pub fn new_meeting_type(duration_minutes: u32) -> NewMeetingType {
    NewMeetingType {
        title: "Intro call".to_string(),
        description: Some("Get to know each other".to_string()),
        duration_minutes,
        meeting_kind: MeetingKind::GoogleMeet,
        business_hours: weekday_hours(),
    }
}

pub fn booking_request(start: DateTime<Utc>, duration_minutes: i64, name: &str) -> BookingRequest {
    BookingRequest {
        attendee_name: name.to_string(),
        attendee_email: format!("{}@example.com", name.to_lowercase()),
        message: None,
        start,
        end: start + Duration::minutes(duration_minutes),
    }
}

/// Calendar double that records created events and serves a fixed busy list.
#[derive(Default)]
pub struct RecordingCalendar {
    busy: Mutex<Vec<BusyPeriod>>,
    created: Mutex<Vec<CalendarEventRequest>>,
    fail_events: Mutex<bool>,
}

impl RecordingCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_busy(&self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.busy.lock().unwrap().push(BusyPeriod { start, end });
    }

    pub fn fail_events(&self, fail: bool) {
        *self.fail_events.lock().unwrap() = fail;
    }

    pub fn created(&self) -> Vec<CalendarEventRequest> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarPort for RecordingCalendar {
    async fn list_busy_intervals(
        &self,
        _credential: &CalendarCredential,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyPeriod>, MeetbookError> {
        Ok(self
            .busy
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.start < window_end && p.end > window_start)
            .copied()
            .collect())
    }

    async fn create_event(
        &self,
        _credential: &CalendarCredential,
        event: CalendarEventRequest,
    ) -> Result<CalendarEventResult, MeetbookError> {
        if *self.fail_events.lock().unwrap() {
            return Err(external_service_error("calendar", "quota exceeded"));
        }
        let mut created = self.created.lock().unwrap();
        created.push(event.clone());
        Ok(CalendarEventResult {
            event_id: format!("evt-{}", created.len()),
            join_url: event
                .request_conference
                .then(|| format!("https://meet.example.com/{}", created.len())),
        })
    }
}

pub struct TestApp {
    pub repository: Arc<InMemoryRepository>,
    pub calendar: Arc<RecordingCalendar>,
    pub clock: Arc<FixedClock>,
    pub state: Arc<SchedulingState>,
}

/// Fresh in-memory app with the owner's calendar linked; "now" is Sunday 2025-06-01 noon Tokyo.
pub async fn test_app() -> TestApp {
    let repository = Arc::new(InMemoryRepository::new());
    repository
        .put_calendar_credential(
            OWNER,
            &CalendarCredential {
                calendar_id: "primary".to_string(),
                access_token: None,
            },
            tokyo(2025, 6, 1, 12, 0),
        )
        .await
        .unwrap();
    let calendar = Arc::new(RecordingCalendar::new());
    let clock = Arc::new(FixedClock::new(tokyo(2025, 6, 1, 12, 0)));
    let state = Arc::new(SchedulingState::new(
        repository.clone(),
        calendar.clone(),
        clock.clone(),
        SchedulingSettings::default(),
    ));
    TestApp {
        repository,
        calendar,
        clock,
        state,
    }
}
