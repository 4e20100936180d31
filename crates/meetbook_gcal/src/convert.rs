//! Mapping between the calendar port's value types and Google Calendar API structs.

use chrono::{DateTime, Utc};
use google_calendar3::api::{
    ConferenceData, ConferenceSolutionKey, CreateConferenceRequest, Event, EventAttendee,
    EventDateTime, FreeBusyRequest, FreeBusyRequestItem, FreeBusyResponse,
};
use meetbook_common::{BusyPeriod, CalendarEventRequest};
use tracing::info;

use crate::error::GcalError;

pub(crate) const MEET_SOLUTION: &str = "hangoutsMeet";

pub fn freebusy_request(
    calendar_id: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> FreeBusyRequest {
    FreeBusyRequest {
        time_min: Some(window_start),
        time_max: Some(window_end),
        time_zone: Some("UTC".to_string()),
        items: Some(vec![FreeBusyRequestItem {
            id: Some(calendar_id.to_string()),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// Busy periods of `calendar_id`, sorted by start.
///
/// Periods with a missing bound or non-positive length are skipped. Per-calendar
/// errors (unknown calendar, missing permission) fail the whole lookup instead
/// of reading as a free calendar.
pub fn busy_periods(
    calendar_id: &str,
    response: FreeBusyResponse,
) -> Result<Vec<BusyPeriod>, GcalError> {
    let Some(info) = response
        .calendars
        .and_then(|mut calendars| calendars.remove(calendar_id))
    else {
        return Ok(Vec::new());
    };

    if let Some(errors) = info.errors.filter(|e| !e.is_empty()) {
        let message = errors
            .iter()
            .filter_map(|e| e.reason.clone())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(GcalError::Calendar {
            calendar_id: calendar_id.to_string(),
            message,
        });
    }

    let mut periods: Vec<BusyPeriod> = info
        .busy
        .unwrap_or_default()
        .into_iter()
        .filter_map(|period| match (period.start, period.end) {
            (Some(start), Some(end)) if start < end => Some(BusyPeriod { start, end }),
            _ => {
                info!("Skipping unusable busy period: {:?}", period);
                None
            }
        })
        .collect();
    periods.sort_by_key(|p| p.start);
    Ok(periods)
}

/// Event body for `request`. `request_id` makes the conference request idempotent.
pub fn event_from_request(request: &CalendarEventRequest, request_id: &str) -> Event {
    let conference_data = request.request_conference.then(|| ConferenceData {
        create_request: Some(CreateConferenceRequest {
            request_id: Some(request_id.to_string()),
            conference_solution_key: Some(ConferenceSolutionKey {
                type_: Some(MEET_SOLUTION.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    });

    Event {
        summary: Some(request.summary.clone()),
        description: Some(request.description.clone()),
        start: Some(EventDateTime {
            date_time: Some(request.start),
            time_zone: Some("UTC".to_string()),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(request.end),
            time_zone: Some("UTC".to_string()),
            ..Default::default()
        }),
        attendees: Some(vec![EventAttendee {
            email: Some(request.attendee_email.clone()),
            ..Default::default()
        }]),
        conference_data,
        ..Default::default()
    }
}

/// Join URL of a created event: the Meet link, else the first video entry point.
pub fn join_url(event: &Event) -> Option<String> {
    event.hangout_link.clone().or_else(|| {
        event
            .conference_data
            .as_ref()?
            .entry_points
            .as_ref()?
            .iter()
            .find(|ep| ep.entry_point_type.as_deref() == Some("video"))
            .and_then(|ep| ep.uri.clone())
    })
}
