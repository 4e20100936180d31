// --- File: crates/meetbook_scheduling/src/models.rs ---
//! Domain records of the scheduling core.

use chrono::{DateTime, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Conferencing provider attached to a meeting type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    Zoom,
    GoogleMeet,
}

impl MeetingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingKind::Zoom => "zoom",
            MeetingKind::GoogleMeet => "google_meet",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "zoom" => Some(MeetingKind::Zoom),
            "google_meet" => Some(MeetingKind::GoogleMeet),
            _ => None,
        }
    }
}

/// One weekday's bookable window. `start_time`/`end_time` are zero-padded "HH:MM".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub enabled: bool,
    pub start_time: String,
    pub end_time: String,
}

impl DaySchedule {
    pub fn open(start_time: &str, end_time: &str) -> Self {
        Self {
            enabled: true,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }

    pub fn closed() -> Self {
        Self {
            enabled: false,
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
        }
    }
}

/// Weekly business hours, indexed by weekday (Monday first).
///
/// Serialized as an object keyed by lowercase weekday names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WeeklyRecord", into = "WeeklyRecord")]
pub struct BusinessHours {
    days: [DaySchedule; 7],
}

impl BusinessHours {
    pub fn new(days: [DaySchedule; 7]) -> Self {
        Self { days }
    }

    /// Every day disabled.
    pub fn closed() -> Self {
        Self::new(std::array::from_fn(|_| DaySchedule::closed()))
    }

    /// The same window on every weekday listed, all other days closed.
    pub fn uniform(open_days: &[Weekday], start_time: &str, end_time: &str) -> Self {
        let mut hours = Self::closed();
        for day in open_days {
            hours.set_day(*day, DaySchedule::open(start_time, end_time));
        }
        hours
    }

    pub fn day(&self, weekday: Weekday) -> &DaySchedule {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    pub fn set_day(&mut self, weekday: Weekday, schedule: DaySchedule) {
        self.days[weekday.num_days_from_monday() as usize] = schedule;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        ALL_WEEKDAYS.iter().copied().zip(self.days.iter())
    }
}

pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Serialize, Deserialize)]
struct WeeklyRecord {
    monday: DaySchedule,
    tuesday: DaySchedule,
    wednesday: DaySchedule,
    thursday: DaySchedule,
    friday: DaySchedule,
    saturday: DaySchedule,
    sunday: DaySchedule,
}

impl From<WeeklyRecord> for BusinessHours {
    fn from(record: WeeklyRecord) -> Self {
        Self::new([
            record.monday,
            record.tuesday,
            record.wednesday,
            record.thursday,
            record.friday,
            record.saturday,
            record.sunday,
        ])
    }
}

impl From<BusinessHours> for WeeklyRecord {
    fn from(hours: BusinessHours) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = hours.days;
        Self {
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        }
    }
}

/// An owner-defined bookable template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingType {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub meeting_kind: MeetingKind,
    pub business_hours: BusinessHours,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl MeetingType {
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Input for creating a meeting type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeetingType {
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub meeting_kind: MeetingKind,
    pub business_hours: BusinessHours,
}

/// Explicit per-field update for a meeting type. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingTypePatch {
    #[serde(default)]
    pub title: Option<String>,
    /// `Some("")` clears the description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub meeting_kind: Option<MeetingKind>,
    #[serde(default)]
    pub business_hours: Option<BusinessHours>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl MeetingTypePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.duration_minutes.is_none()
            && self.meeting_kind.is_none()
            && self.business_hours.is_none()
            && self.is_active.is_none()
    }

    pub fn apply_to(&self, meeting_type: &mut MeetingType) {
        if let Some(title) = &self.title {
            meeting_type.title = title.clone();
        }
        if let Some(description) = &self.description {
            meeting_type.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if let Some(duration) = self.duration_minutes {
            meeting_type.duration_minutes = duration;
        }
        if let Some(kind) = self.meeting_kind {
            meeting_type.meeting_kind = kind;
        }
        if let Some(hours) = &self.business_hours {
            meeting_type.business_hours = hours.clone();
        }
        if let Some(active) = self.is_active {
            meeting_type.is_active = active;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(BookingStatus::Scheduled),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// `scheduled ⇄ cancelled`, `scheduled → completed`; staying put is always allowed.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Scheduled, Cancelled) | (Scheduled, Completed) | (Cancelled, Scheduled)
        ) || self == next
    }

    pub fn is_active(self) -> bool {
        self != BookingStatus::Cancelled
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open absolute time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// A participant's confirmed (or formerly confirmed) slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub meeting_type_id: String,
    /// Owner of the meeting type at booking time; the overlap invariant is per owner.
    pub owner_id: String,
    pub attendee_name: String,
    pub attendee_email: String,
    pub message: Option<String>,
    pub scheduled_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub external_event_id: Option<String>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn interval(&self) -> TimeRange {
        TimeRange::new(self.scheduled_time, self.end_time)
    }

    pub fn calendar_synced(&self) -> bool {
        self.external_event_id.is_some()
    }
}

/// Contact details submitted by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Why a slot cannot be booked. Precedence: past > owner busy > outside business hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockedReason {
    None,
    OwnerBusy,
    OutsideBusinessHours,
    Past,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
    pub blocked_reason: BlockedReason,
}

impl Slot {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Participant,
    Owner,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "participant" => Some(Role::Participant),
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Authenticated identity handed to the core by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can_own_meetings(&self) -> bool {
        matches!(self.role, Role::Owner | Role::Admin)
    }
}

/// A booking joined with the meeting-type fields shown on the owner dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub calendar_synced: bool,
    /// `None` once the meeting type has been deleted.
    pub meeting_title: Option<String>,
    pub meeting_duration_minutes: Option<u32>,
    pub meeting_kind: Option<MeetingKind>,
}
