use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};
use chrono_tz::Asia::Tokyo;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meetbook_scheduling::business_hours::{GridSettings, SlotGrid};
use meetbook_scheduling::models::{BusinessHours, TimeRange};
use meetbook_scheduling::BusyIntervalSet;

fn base() -> DateTime<Utc> {
    Tokyo
        .with_ymd_and_hms(2025, 6, 2, 0, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

// Every other half hour busy across the window
fn create_busy_set(days: i64) -> BusyIntervalSet {
    let mut ranges = Vec::new();
    let mut cursor = base();
    let end = base() + Duration::days(days);
    while cursor < end {
        ranges.push(TimeRange::new(cursor, cursor + Duration::minutes(30)));
        cursor += Duration::hours(1);
    }
    BusyIntervalSet::new(ranges)
}

fn benchmark_slot_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_grid");
    let hours = BusinessHours::uniform(
        &[
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ],
        "09:00",
        "17:00",
    );
    let settings = GridSettings {
        time_zone: Tokyo,
        step: Duration::minutes(30),
    };

    for days in [7i64, 31] {
        let window = TimeRange::new(base(), base() + Duration::days(days));
        let busy = create_busy_set(days);

        group.bench_function(format!("generate_{days}_days"), |b| {
            b.iter(|| {
                SlotGrid::new(
                    black_box(&hours),
                    Duration::minutes(30),
                    black_box(window),
                    settings,
                    None,
                )
                .unwrap()
                .count()
            })
        });

        group.bench_function(format!("classify_{days}_days"), |b| {
            b.iter(|| {
                SlotGrid::new(&hours, Duration::minutes(45), window, settings, None)
                    .unwrap()
                    .filter(|slot| !busy.overlaps(black_box(slot.start), slot.end))
                    .count()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_slot_grid);
criterion_main!(benches);
