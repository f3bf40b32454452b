/// Benchmarks for the commit scheduler and the work-item assigner over a
/// year-long window.
use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

use gitpulse::schedule::ActiveHours;
use gitpulse::{assign, schedule, DateWindow, ScheduleConstraints, WorkItem};

fn year_window() -> DateWindow {
    DateWindow::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap(),
    )
    .unwrap()
}

fn constraints() -> ScheduleConstraints {
    ScheduleConstraints {
        frequency: 0.8,
        max_commits_per_day: 10,
        min_commits_per_day: 1,
        exclude_weekends: true,
        active_hours: ActiveHours::default(),
    }
}

fn benchmark_schedule(c: &mut Criterion) {
    let window = year_window();
    let constraints = constraints();
    c.bench_function("schedule_year", |b| {
        b.iter(|| schedule(&window, &constraints, Some(42)).unwrap())
    });
}

fn benchmark_assign(c: &mut Criterion) {
    let window = year_window();
    let constraints = constraints();
    let skeletons = schedule(&window, &constraints, Some(42)).unwrap();
    let items: Vec<WorkItem> = (0..2000)
        .map(|i| WorkItem {
            path: format!("src/file_{i}.rs"),
            kind: "source".to_string(),
            category: format!("area_{}", i % 8),
            weight: 1,
        })
        .collect();

    c.bench_function("assign_year", |b| {
        b.iter(|| assign(&items, skeletons.clone(), Some(42)))
    });
}

criterion_group!(benches, benchmark_schedule, benchmark_assign);
criterion_main!(benches);
