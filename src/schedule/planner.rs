use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GitPulseError, Result};
use crate::types::{CommitBatch, DateWindow};

/// Sub-daily range within which synthetic commit timestamps are drawn, as
/// minutes from midnight. `end_minute` is exclusive. The default covers
/// 09:00 through 18:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveHours {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self {
            start_minute: 9 * 60,
            end_minute: 19 * 60,
        }
    }
}

impl ActiveHours {
    /// Number of distinct minutes in the range.
    pub fn span(&self) -> u32 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    fn validate(&self) -> Result<()> {
        if self.start_minute >= self.end_minute || self.end_minute > 24 * 60 {
            return Err(GitPulseError::Config(format!(
                "active hours {}..{} are not a valid minute range",
                self.start_minute, self.end_minute
            )));
        }
        Ok(())
    }
}

/// Activity constraints for the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConstraints {
    /// Probability in [0, 1] that a given day produces any batches.
    pub frequency: f64,
    /// Upper bound on batches per day. Must be positive.
    pub max_commits_per_day: u32,
    /// Lower bound on batches per day. A positive minimum forces at least
    /// one batch on every scheduled day regardless of the frequency trial.
    pub min_commits_per_day: u32,
    /// Skip Saturdays and Sundays entirely.
    pub exclude_weekends: bool,
    pub active_hours: ActiveHours,
}

impl ScheduleConstraints {
    /// Fail-fast validation, run before any scheduling work begins.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.frequency) {
            return Err(GitPulseError::Config(format!(
                "frequency must be within [0, 1], got {}",
                self.frequency
            )));
        }
        if self.max_commits_per_day == 0 {
            return Err(GitPulseError::Config(
                "max_commits_per_day must be positive".to_string(),
            ));
        }
        if self.max_commits_per_day < self.min_commits_per_day {
            return Err(GitPulseError::Config(format!(
                "max_commits_per_day ({}) is below min_commits_per_day ({})",
                self.max_commits_per_day, self.min_commits_per_day
            )));
        }
        self.active_hours.validate()
    }
}

/// Partition the window into an ordered sequence of dated batch skeletons.
///
/// Every calendar day the window covers is visited exactly once, in order.
/// With a seed, all random draws derive from one seeded stream and the whole
/// schedule is reproducible end to end; without one, draws are unseeded.
///
/// Invalid constraints abort before any day is visited; no partial schedule
/// is ever returned.
pub fn schedule(
    window: &DateWindow,
    constraints: &ScheduleConstraints,
    seed: Option<u64>,
) -> Result<Vec<CommitBatch>> {
    constraints.validate()?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut batches = Vec::new();
    for day in window.days() {
        plan_day(day, constraints, &mut rng, &mut batches);
    }
    debug!(
        days = window.day_count(),
        batches = batches.len(),
        "schedule complete"
    );
    Ok(batches)
}

fn plan_day(
    day: NaiveDate,
    constraints: &ScheduleConstraints,
    rng: &mut StdRng,
    batches: &mut Vec<CommitBatch>,
) {
    if constraints.exclude_weekends && is_weekend(day) {
        debug!(%day, "weekend excluded");
        return;
    }

    let hit = rng.gen_bool(constraints.frequency);
    if !hit && constraints.min_commits_per_day == 0 {
        debug!(%day, "frequency trial missed");
        return;
    }

    let lo = constraints.min_commits_per_day.max(1);
    let hi = constraints.max_commits_per_day;
    let hours = constraints.active_hours;
    // Minutes are unique within a day, so the count can never exceed the
    // active-hours span.
    let count = rng.gen_range(lo..=hi).min(hours.span());

    let mut minutes: Vec<u32> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut minute = rng.gen_range(hours.start_minute..hours.end_minute);
        // Colliding draws are nudged forward a minute at a time, wrapping
        // inside the active hours so the timestamp stays within its day.
        while minutes.contains(&minute) {
            minute += 1;
            if minute >= hours.end_minute {
                minute = hours.start_minute;
            }
        }
        minutes.push(minute);
    }
    minutes.sort_unstable();

    for minute in minutes {
        let timestamp = minute_timestamp(day, minute);
        batches.push(CommitBatch {
            timestamp,
            items: Vec::new(),
            label: format!("Contribution: {}", timestamp.format("%Y-%m-%d %H:%M")),
        });
    }
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

fn minute_timestamp(day: NaiveDate, minute: u32) -> DateTime<Utc> {
    let time =
        NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&day.and_time(time))
}
