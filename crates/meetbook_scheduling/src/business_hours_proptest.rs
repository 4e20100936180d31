#[cfg(test)]
mod tests {
    use crate::business_hours::{GridSettings, SlotGrid};
    use crate::busy::BusyIntervalSet;
    use crate::models::{BusinessHours, DaySchedule, TimeRange, ALL_WEEKDAYS};
    use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
    use chrono_tz::Asia::Tokyo;
    use proptest::prelude::*;

    fn clock_string(minutes: u32) -> String {
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }

    fn base() -> DateTime<Utc> {
        Tokyo
            .with_ymd_and_hms(2025, 6, 2, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    proptest! {
        // Every emitted slot lies on the step grid inside its day's window.
        #[test]
        fn test_slots_respect_business_hours(
            open_minutes in (0u32..48).prop_map(|q| q * 30),
            span_minutes in (1u32..20).prop_map(|q| q * 30),
            duration_minutes in (1u32..16).prop_map(|q| q * 15),
            enabled_mask in 0u8..128,
            window_days in 1i64..15,
            now_offset_hours in -24i64..200,
        ) {
            let close_minutes = (open_minutes + span_minutes).min(23 * 60 + 59);
            let mut hours = BusinessHours::closed();
            for (i, weekday) in ALL_WEEKDAYS.iter().enumerate() {
                if enabled_mask & (1 << i) != 0 {
                    hours.set_day(
                        *weekday,
                        DaySchedule::open(&clock_string(open_minutes), &clock_string(close_minutes)),
                    );
                }
            }
            let window = TimeRange::new(base(), base() + Duration::days(window_days));
            let now = base() + Duration::hours(now_offset_hours);
            let step = Duration::minutes(30);
            let duration = Duration::minutes(i64::from(duration_minutes));

            let slots: Vec<TimeRange> = SlotGrid::new(
                &hours,
                duration,
                window,
                GridSettings { time_zone: Tokyo, step },
                Some(now),
            )
            .unwrap()
            .collect();

            let mut previous: Option<DateTime<Utc>> = None;
            for slot in &slots {
                prop_assert_eq!(slot.length(), duration);
                prop_assert!(slot.start > now);
                prop_assert!(slot.start >= window.start && slot.start < window.end);

                let local_start = slot.start.with_timezone(&Tokyo);
                let local_end = slot.end.with_timezone(&Tokyo);
                let start_min = local_start.hour() * 60 + local_start.minute();
                prop_assert!(start_min >= open_minutes);
                prop_assert_eq!((start_min - open_minutes) % 30, 0);
                prop_assert_eq!(local_start.date_naive(), local_end.date_naive());
                prop_assert!(local_end.hour() * 60 + local_end.minute() <= close_minutes);

                let day = hours.day(chrono::Datelike::weekday(&local_start));
                prop_assert!(day.enabled);

                if let Some(prev) = previous {
                    prop_assert!(slot.start > prev);
                }
                previous = Some(slot.start);
            }
        }

        // Merging never changes which ranges overlap the set.
        #[test]
        fn test_busy_set_overlap_matches_naive_scan(
            raw in prop::collection::vec((0i64..500, 1i64..120), 0..20),
            probe_start in 0i64..600,
            probe_len in 1i64..120,
        ) {
            let ranges: Vec<TimeRange> = raw
                .iter()
                .map(|(offset, len)| {
                    let start = base() + Duration::minutes(*offset);
                    TimeRange::new(start, start + Duration::minutes(*len))
                })
                .collect();
            let set = BusyIntervalSet::new(ranges.clone());
            let start = base() + Duration::minutes(probe_start);
            let probe = TimeRange::new(start, start + Duration::minutes(probe_len));

            let naive = ranges.iter().any(|r| r.overlaps(&probe));
            prop_assert_eq!(set.overlaps(probe.start, probe.end), naive);

            let merged: Vec<&TimeRange> = set.iter().collect();
            for pair in merged.windows(2) {
                prop_assert!(pair[0].end < pair[1].start);
            }
        }
    }
}
