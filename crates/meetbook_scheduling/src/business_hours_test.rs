#[cfg(test)]
mod tests {
    use crate::business_hours::{
        is_on_grid, parse_clock, validate_business_hours, GridSettings, SlotGrid,
    };
    use crate::error::SchedulingError;
    use crate::models::{BusinessHours, DaySchedule, TimeRange};
    use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc, Weekday};
    use chrono_tz::{America::New_York, Asia::Tokyo, Tz};

    fn local(tz: Tz, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        tz.with_ymd_and_hms(y, m, d, h, min, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn tokyo(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        local(Tokyo, y, m, d, h, min)
    }

    fn settings(tz: Tz) -> GridSettings {
        GridSettings {
            time_zone: tz,
            step: Duration::minutes(30),
        }
    }

    fn long_ago() -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
    }

    // 2025-06-02 is a Monday.
    fn monday_window() -> TimeRange {
        TimeRange::new(tokyo(2025, 6, 2, 0, 0), tokyo(2025, 6, 3, 0, 0))
    }

    fn starts(grid: SlotGrid) -> Vec<DateTime<Utc>> {
        grid.map(|slot| slot.start).collect()
    }

    #[test]
    fn test_parse_clock_accepts_zero_padded_times() {
        assert_eq!(
            parse_clock("09:00").unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            parse_clock("23:59").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap()
        );
        assert_eq!(
            parse_clock("00:00").unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_clock_rejects_malformed_values() {
        for bad in ["9:00", "24:00", "09:60", "ab:cd", "09-00", "", "09:000", "+9:00"] {
            let err = parse_clock(bad).unwrap_err();
            assert!(
                matches!(err, SchedulingError::Configuration(_)),
                "{bad} should be a configuration error, got {err:?}"
            );
        }
    }

    #[test]
    fn test_slots_walk_the_day_in_steps() {
        let hours = BusinessHours::uniform(&[Weekday::Mon], "09:00", "11:00");
        let grid = SlotGrid::new(
            &hours,
            Duration::minutes(30),
            monday_window(),
            settings(Tokyo),
            long_ago(),
        )
        .unwrap();

        assert_eq!(
            starts(grid),
            vec![
                tokyo(2025, 6, 2, 9, 0),
                tokyo(2025, 6, 2, 9, 30),
                tokyo(2025, 6, 2, 10, 0),
                tokyo(2025, 6, 2, 10, 30),
            ]
        );
    }

    #[test]
    fn test_long_meetings_must_fit_before_closing() {
        let hours = BusinessHours::uniform(&[Weekday::Mon], "09:00", "11:00");
        let slots: Vec<TimeRange> = SlotGrid::new(
            &hours,
            Duration::minutes(45),
            monday_window(),
            settings(Tokyo),
            long_ago(),
        )
        .unwrap()
        .collect();

        assert_eq!(slots.len(), 3);
        for slot in &slots {
            assert_eq!(slot.length(), Duration::minutes(45));
            assert!(slot.end <= tokyo(2025, 6, 2, 11, 0));
        }
        assert_eq!(slots[2].start, tokyo(2025, 6, 2, 10, 0));
    }

    #[test]
    fn test_disabled_days_are_skipped_even_when_malformed() {
        let mut hours = BusinessHours::closed();
        hours.set_day(
            Weekday::Mon,
            DaySchedule {
                enabled: false,
                start_time: "nonsense".to_string(),
                end_time: "25:99".to_string(),
            },
        );
        let grid = SlotGrid::new(
            &hours,
            Duration::minutes(30),
            monday_window(),
            settings(Tokyo),
            long_ago(),
        )
        .unwrap();
        assert_eq!(grid.count(), 0);
    }

    #[test]
    fn test_malformed_enabled_day_is_a_configuration_error() {
        let mut hours = BusinessHours::closed();
        hours.set_day(Weekday::Fri, DaySchedule::open("9am", "17:00"));
        let result = SlotGrid::new(
            &hours,
            Duration::minutes(30),
            monday_window(),
            settings(Tokyo),
            long_ago(),
        );
        assert!(matches!(result, Err(SchedulingError::Configuration(_))));
    }

    #[test]
    fn test_empty_day_window_yields_no_slots() {
        let hours = BusinessHours::uniform(&[Weekday::Mon], "10:00", "10:00");
        let grid = SlotGrid::new(
            &hours,
            Duration::minutes(30),
            monday_window(),
            settings(Tokyo),
            long_ago(),
        )
        .unwrap();
        assert_eq!(grid.count(), 0);
    }

    #[test]
    fn test_slots_at_or_before_now_are_not_emitted() {
        let hours = BusinessHours::uniform(&[Weekday::Mon], "09:00", "11:00");
        let grid = SlotGrid::new(
            &hours,
            Duration::minutes(30),
            monday_window(),
            settings(Tokyo),
            Some(tokyo(2025, 6, 2, 9, 30)),
        )
        .unwrap();
        assert_eq!(
            starts(grid),
            vec![tokyo(2025, 6, 2, 10, 0), tokyo(2025, 6, 2, 10, 30)]
        );
    }

    #[test]
    fn test_window_bounds_slot_starts() {
        let hours = BusinessHours::uniform(&[Weekday::Mon], "09:00", "11:00");
        let window = TimeRange::new(tokyo(2025, 6, 2, 9, 45), tokyo(2025, 6, 2, 10, 30));
        let grid = SlotGrid::new(
            &hours,
            Duration::minutes(30),
            window,
            settings(Tokyo),
            long_ago(),
        )
        .unwrap();
        assert_eq!(starts(grid), vec![tokyo(2025, 6, 2, 10, 0)]);
    }

    #[test]
    fn test_grid_spans_multiple_days_in_order() {
        let hours = BusinessHours::uniform(
            &[Weekday::Mon, Weekday::Wed],
            "09:00",
            "10:00",
        );
        let window = TimeRange::new(tokyo(2025, 6, 2, 0, 0), tokyo(2025, 6, 9, 0, 0));
        let grid = SlotGrid::new(
            &hours,
            Duration::minutes(30),
            window,
            settings(Tokyo),
            long_ago(),
        )
        .unwrap();
        assert_eq!(
            starts(grid),
            vec![
                tokyo(2025, 6, 2, 9, 0),
                tokyo(2025, 6, 2, 9, 30),
                tokyo(2025, 6, 4, 9, 0),
                tokyo(2025, 6, 4, 9, 30),
            ]
        );
    }

    #[test]
    fn test_grid_can_be_walked_again_from_a_clone() {
        let hours = BusinessHours::uniform(&[Weekday::Mon], "09:00", "12:00");
        let grid = SlotGrid::new(
            &hours,
            Duration::minutes(60),
            monday_window(),
            settings(Tokyo),
            long_ago(),
        )
        .unwrap();
        let first: Vec<_> = grid.clone().collect();
        let second: Vec<_> = grid.collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_spring_forward_gap_is_skipped() {
        // 2025-03-09 02:00 does not exist in New York.
        let hours = BusinessHours::uniform(&[Weekday::Sun], "01:00", "04:00");
        let window = TimeRange::new(
            local(New_York, 2025, 3, 9, 0, 0),
            local(New_York, 2025, 3, 10, 0, 0),
        );
        let slots: Vec<TimeRange> = SlotGrid::new(
            &hours,
            Duration::minutes(30),
            window,
            settings(New_York),
            long_ago(),
        )
        .unwrap()
        .collect();

        let expected: Vec<DateTime<Utc>> = vec![
            Utc.with_ymd_and_hms(2025, 3, 9, 6, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 9, 6, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 9, 7, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 9, 7, 30, 0).unwrap(),
        ];
        assert_eq!(slots.iter().map(|s| s.start).collect::<Vec<_>>(), expected);
        // Durations stay absolute across the shift.
        assert!(slots.iter().all(|s| s.length() == Duration::minutes(30)));
    }

    #[test]
    fn test_fall_back_fold_uses_the_earlier_instant() {
        // 01:00-02:00 happens twice on 2025-11-02 in New York.
        let hours = BusinessHours::uniform(&[Weekday::Sun], "01:00", "02:00");
        let window = TimeRange::new(
            local(New_York, 2025, 11, 2, 0, 0),
            local(New_York, 2025, 11, 3, 0, 0),
        );
        let grid = SlotGrid::new(
            &hours,
            Duration::minutes(30),
            window,
            settings(New_York),
            long_ago(),
        )
        .unwrap();
        assert_eq!(
            starts(grid),
            vec![
                Utc.with_ymd_and_hms(2025, 11, 2, 5, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 11, 2, 5, 30, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_is_on_grid() {
        let hours = BusinessHours::uniform(&[Weekday::Mon], "09:00", "11:00");
        let duration = Duration::minutes(30);
        let s = settings(Tokyo);
        assert!(is_on_grid(&hours, duration, tokyo(2025, 6, 2, 9, 30), s).unwrap());
        assert!(!is_on_grid(&hours, duration, tokyo(2025, 6, 2, 9, 15), s).unwrap());
        assert!(!is_on_grid(&hours, duration, tokyo(2025, 6, 2, 8, 30), s).unwrap());
        assert!(!is_on_grid(&hours, duration, tokyo(2025, 6, 2, 10, 45), s).unwrap());
        assert!(!is_on_grid(&hours, duration, tokyo(2025, 6, 3, 9, 30), s).unwrap());
    }

    #[test]
    fn test_validate_business_hours() {
        let ok = BusinessHours::uniform(&[Weekday::Mon, Weekday::Tue], "09:00", "17:00");
        assert!(validate_business_hours(&ok).is_ok());

        let inverted = BusinessHours::uniform(&[Weekday::Mon], "17:00", "09:00");
        assert!(matches!(
            validate_business_hours(&inverted),
            Err(SchedulingError::Validation(_))
        ));

        let malformed = BusinessHours::uniform(&[Weekday::Mon], "9:00", "17:00");
        assert!(matches!(
            validate_business_hours(&malformed),
            Err(SchedulingError::Validation(_))
        ));
    }

    #[test]
    fn test_business_hours_serialize_by_weekday_name() {
        let hours = BusinessHours::uniform(&[Weekday::Mon], "09:00", "17:00");
        let json = serde_json::to_value(&hours).unwrap();
        assert_eq!(json["monday"]["enabled"], true);
        assert_eq!(json["monday"]["startTime"], "09:00");
        assert_eq!(json["sunday"]["enabled"], false);

        let back: BusinessHours = serde_json::from_value(json).unwrap();
        assert_eq!(back, hours);
    }
}
