// --- File: crates/meetbook_scheduling/src/test_support.rs ---
//! Shared doubles and builders for unit tests.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc, Weekday};
use chrono_tz::Asia::Tokyo;
use meetbook_common::{
    BusyPeriod, CalendarCredential, CalendarEventRequest, CalendarEventResult, CalendarPort,
    MeetbookError,
};
use mockall::mock;

use crate::availability::SchedulingSettings;
use crate::models::{
    Booking, BookingStatus, BusinessHours, MeetingKind, MeetingType, TimeRange,
};

mock! {
    pub Calendar {}

    #[async_trait]
    impl CalendarPort for Calendar {
        async fn list_busy_intervals(
            &self,
            credential: &CalendarCredential,
            window_start: DateTime<Utc>,
            window_end: DateTime<Utc>,
        ) -> Result<Vec<BusyPeriod>, MeetbookError>;

        async fn create_event(
            &self,
            credential: &CalendarCredential,
            event: CalendarEventRequest,
        ) -> Result<CalendarEventResult, MeetbookError>;
    }
}

/// A calendar that never answers within any sane timeout.
pub struct StalledCalendar;

#[async_trait]
impl CalendarPort for StalledCalendar {
    async fn list_busy_intervals(
        &self,
        _credential: &CalendarCredential,
        _window_start: DateTime<Utc>,
        _window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyPeriod>, MeetbookError> {
        tokio::time::sleep(StdDuration::from_secs(3600)).await;
        Ok(Vec::new())
    }

    async fn create_event(
        &self,
        _credential: &CalendarCredential,
        _event: CalendarEventRequest,
    ) -> Result<CalendarEventResult, MeetbookError> {
        tokio::time::sleep(StdDuration::from_secs(3600)).await;
        Ok(CalendarEventResult {
            event_id: "late".to_string(),
            join_url: None,
        })
    }
}

pub const OWNER: &str = "owner-1";

pub fn tokyo(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Tokyo
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn credential() -> CalendarCredential {
    CalendarCredential {
        calendar_id: "primary".to_string(),
        access_token: Some("token".to_string()),
    }
}

pub fn settings() -> SchedulingSettings {
    SchedulingSettings {
        calendar_timeout: StdDuration::from_secs(2),
        ..SchedulingSettings::default()
    }
}

/// Weekdays 09:00-12:00 Tokyo, 30 minutes, Google Meet.
pub fn meeting_type(id: &str) -> MeetingType {
    MeetingType {
        id: id.to_string(),
        owner_id: OWNER.to_string(),
        title: "Intro call".to_string(),
        description: Some("Say hello".to_string()),
        duration_minutes: 30,
        meeting_kind: MeetingKind::GoogleMeet,
        business_hours: BusinessHours::uniform(
            &[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            "09:00",
            "12:00",
        ),
        is_active: true,
        created_at: tokyo(2025, 5, 1, 9, 0),
    }
}

pub fn booking(id: &str, meeting_type: &MeetingType, slot: TimeRange, status: BookingStatus) -> Booking {
    Booking {
        id: id.to_string(),
        meeting_type_id: meeting_type.id.clone(),
        owner_id: meeting_type.owner_id.clone(),
        attendee_name: "Ada".to_string(),
        attendee_email: "ada@example.com".to_string(),
        message: None,
        scheduled_time: slot.start,
        end_time: slot.end,
        status,
        external_event_id: None,
        meeting_link: None,
        created_at: tokyo(2025, 5, 30, 9, 0),
    }
}
