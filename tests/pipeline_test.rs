//! End-to-end tests over the public API: plan a schedule, assign work items,
//! and aggregate statistics through a scripted fetch client.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc, Weekday};

use gitpulse::config::FetchConfig;
use gitpulse::schedule::ActiveHours;
use gitpulse::{
    assign, schedule, Aggregator, CommitRecord, CommitRef, DateWindow, FetchClient, FetchError,
    ScheduleConstraints, WorkItem,
};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn work_items() -> Vec<WorkItem> {
    let mut items = Vec::new();
    for i in 0..12 {
        items.push(WorkItem {
            path: format!("src/module_{i}.rs"),
            kind: "source".to_string(),
            category: format!("feature_{}", i % 3),
            weight: 1,
        });
    }
    for i in 0..4 {
        items.push(WorkItem {
            path: format!("docs/page_{i}.md"),
            kind: "doc".to_string(),
            category: "docs".to_string(),
            weight: 1,
        });
    }
    items
}

#[test]
fn plan_and_assign_produce_an_executable_batch_sequence() {
    let window = DateWindow::new(at(2024, 3, 1), at(2024, 3, 31)).unwrap();
    let constraints = ScheduleConstraints {
        frequency: 0.9,
        max_commits_per_day: 3,
        min_commits_per_day: 1,
        exclude_weekends: true,
        active_hours: ActiveHours::default(),
    };

    let skeletons = schedule(&window, &constraints, Some(99)).unwrap();
    assert!(!skeletons.is_empty());

    let batches = assign(&work_items(), skeletons.clone(), Some(99));
    assert!(!batches.is_empty());
    assert!(batches.len() <= skeletons.len());

    let covered_days = window.days();
    let mut last_timestamp = None;
    for batch in &batches {
        // Executable batches carry items, keep weekday policy, land on the
        // window's calendar days, and stay in chronological order.
        assert!(!batch.items.is_empty());
        let weekday = batch.timestamp.weekday();
        assert!(weekday != Weekday::Sat && weekday != Weekday::Sun);
        assert!(covered_days.contains(&batch.timestamp.date_naive()));
        if let Some(last) = last_timestamp {
            assert!(batch.timestamp > last);
        }
        last_timestamp = Some(batch.timestamp);
    }

    // The same seed replays the same plan.
    let replay = assign(
        &work_items(),
        schedule(&window, &constraints, Some(99)).unwrap(),
        Some(99),
    );
    assert_eq!(replay, batches);
}

struct ScriptedClient {
    refs: Vec<CommitRef>,
    transient_left: Mutex<HashMap<String, u32>>,
}

#[async_trait]
impl FetchClient for ScriptedClient {
    async fn list_commits(&self, window: &DateWindow) -> Result<Vec<CommitRef>, FetchError> {
        Ok(self
            .refs
            .iter()
            .filter(|r| window.contains(r.timestamp))
            .cloned()
            .collect())
    }

    async fn fetch_detail(&self, commit: &CommitRef) -> Result<CommitRecord, FetchError> {
        if let Some(left) = self.transient_left.lock().unwrap().get_mut(&commit.id) {
            if *left > 0 {
                *left -= 1;
                return Err(FetchError::Transient("flaky network".to_string()));
            }
        }
        Ok(CommitRecord {
            id: commit.id.clone(),
            author: commit.author.clone(),
            timestamp: commit.timestamp,
            message: "change".to_string(),
        })
    }
}

#[tokio::test]
async fn aggregation_survives_flaky_fetches_and_window_filtering() {
    let refs = vec![
        CommitRef {
            id: "a1".into(),
            author: "ada".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
        },
        CommitRef {
            id: "a2".into(),
            author: "ada".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 11, 0, 0).unwrap(),
        },
        CommitRef {
            id: "b1".into(),
            author: "grace".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
        },
        // Outside the aggregation window; the listing filters it out.
        CommitRef {
            id: "old".into(),
            author: "ada".into(),
            timestamp: Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).unwrap(),
        },
    ];
    let client = ScriptedClient {
        refs,
        transient_left: Mutex::new(HashMap::from([("b1".to_string(), 1)])),
    };

    let config = FetchConfig {
        request_timeout_secs: 5,
        max_retries: 2,
        retry_delay_ms: 1,
        max_concurrent_requests: 2,
        user_agent: "gitpulse-tests".to_string(),
    };
    let aggregator = Aggregator::new(client, &config);

    let window = DateWindow::new(at(2024, 3, 1), at(2024, 4, 1)).unwrap();
    let outcome = aggregator.aggregate(&window).await.unwrap();

    assert_eq!(outcome.stats.total, 3);
    assert_eq!(outcome.stats.by_author.get("ada"), Some(&2));
    assert_eq!(outcome.stats.by_author.get("grace"), Some(&1));
    assert_eq!(outcome.stats.unique_commit_days(), 2);
    assert!(outcome.skipped.is_empty());

    let top = aggregator.top_contributors(&window, 1).await.unwrap();
    assert_eq!(top, vec![("ada".to_string(), 2)]);
}
