#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, TimeZone, Utc};
    use google_calendar3::api::{
        ConferenceData, EntryPoint, Error as ApiError, Event, FreeBusyCalendar,
        FreeBusyResponse, TimePeriod,
    };
    use meetbook_common::CalendarEventRequest;

    use crate::convert::{busy_periods, event_from_request, freebusy_request, join_url};
    use crate::error::GcalError;

    fn at(h: u32, m: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn response(calendar: &str, info: FreeBusyCalendar) -> FreeBusyResponse {
        let mut calendars = HashMap::new();
        calendars.insert(calendar.to_string(), info);
        FreeBusyResponse {
            calendars: Some(calendars),
            ..Default::default()
        }
    }

    fn request(conference: bool) -> CalendarEventRequest {
        CalendarEventRequest {
            summary: "Intro call - Ada".to_string(),
            description: "Meeting type: Intro call".to_string(),
            start: at(0, 0),
            end: at(0, 30),
            attendee_email: "ada@example.com".to_string(),
            request_conference: conference,
        }
    }

    #[test]
    fn test_freebusy_request_targets_one_calendar() {
        let req = freebusy_request("team@example.com", at(0, 0), at(9, 0));
        assert_eq!(req.time_min, Some(at(0, 0)));
        assert_eq!(req.time_max, Some(at(9, 0)));
        let items = req.items.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_deref(), Some("team@example.com"));
    }

    #[test]
    fn test_busy_periods_are_sorted_and_incomplete_ones_skipped() {
        let info = FreeBusyCalendar {
            busy: Some(vec![
                TimePeriod {
                    start: Some(at(3, 0)),
                    end: Some(at(4, 0)),
                },
                TimePeriod {
                    start: Some(at(1, 0)),
                    end: None,
                },
                TimePeriod {
                    start: Some(at(2, 0)),
                    end: Some(at(2, 0)),
                },
                TimePeriod {
                    start: Some(at(0, 30)),
                    end: Some(at(1, 0)),
                },
            ]),
            ..Default::default()
        };
        let periods = busy_periods("primary", response("primary", info)).unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].start, at(0, 30));
        assert_eq!(periods[1].end, at(4, 0));
    }

    #[test]
    fn test_unknown_calendar_in_response_means_no_busy_time() {
        let periods =
            busy_periods("primary", response("other", FreeBusyCalendar::default())).unwrap();
        assert!(periods.is_empty());
        assert!(busy_periods("primary", FreeBusyResponse::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_calendar_errors_fail_the_lookup() {
        let info = FreeBusyCalendar {
            errors: Some(vec![ApiError {
                domain: Some("calendar".to_string()),
                reason: Some("notFound".to_string()),
            }]),
            ..Default::default()
        };
        match busy_periods("primary", response("primary", info)) {
            Err(GcalError::Calendar { message, .. }) => assert_eq!(message, "notFound"),
            other => panic!("expected calendar error, got {other:?}"),
        }
    }

    #[test]
    fn test_event_carries_attendee_and_times() {
        let event = event_from_request(&request(false), "req-1");
        assert_eq!(event.summary.as_deref(), Some("Intro call - Ada"));
        assert_eq!(event.start.unwrap().date_time, Some(at(0, 0)));
        assert_eq!(
            event.end.unwrap().date_time,
            Some(at(0, 0) + Duration::minutes(30))
        );
        let attendees = event.attendees.unwrap();
        assert_eq!(attendees[0].email.as_deref(), Some("ada@example.com"));
        assert!(event.conference_data.is_none());
    }

    #[test]
    fn test_conference_is_requested_for_meet() {
        let event = event_from_request(&request(true), "req-2");
        let create = event.conference_data.unwrap().create_request.unwrap();
        assert_eq!(create.request_id.as_deref(), Some("req-2"));
        assert_eq!(
            create.conference_solution_key.unwrap().type_.as_deref(),
            Some("hangoutsMeet")
        );
    }

    #[test]
    fn test_join_url_prefers_hangout_link_then_video_entry_point() {
        let with_link = Event {
            hangout_link: Some("https://meet.google.com/abc-defg-hij".to_string()),
            ..Default::default()
        };
        assert_eq!(
            join_url(&with_link).as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );

        let with_entry_points = Event {
            conference_data: Some(ConferenceData {
                entry_points: Some(vec![
                    EntryPoint {
                        entry_point_type: Some("phone".to_string()),
                        uri: Some("tel:+1-555-0100".to_string()),
                        ..Default::default()
                    },
                    EntryPoint {
                        entry_point_type: Some("video".to_string()),
                        uri: Some("https://meet.google.com/xyz".to_string()),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            join_url(&with_entry_points).as_deref(),
            Some("https://meet.google.com/xyz")
        );
        assert_eq!(join_url(&Event::default()), None);
    }
}
