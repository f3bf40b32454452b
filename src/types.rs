//! # Common Types
//!
//! This module contains the common value types used throughout the application:
//! date windows, commit batches and work items on the scheduling side, and
//! commit records and contribution statistics on the aggregation side.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GitPulseError, Result};

/// A half-open time interval `[start, end)`.
///
/// Windows are immutable once constructed and always satisfy `start <= end`.
/// The half-open end means a commit at exactly `end` belongs to the next
/// window when windows are chained, so boundary instants are never counted
/// twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateWindow {
    /// Create a window. Fails if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(GitPulseError::InvalidDate(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Window anchored on `now`, spanning `days_before` into the past and
    /// `days_after` into the future.
    pub fn anchored(now: DateTime<Utc>, days_before: i64, days_after: i64) -> Result<Self> {
        Self::new(now - Duration::days(days_before), now + Duration::days(days_after))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether the instant falls inside the window. Half-open: `end` itself
    /// is excluded.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Clamp this window against lookback/lookahead limits around `now`,
    /// returning a new window. A window entirely outside the limits collapses
    /// to a zero-length window at the nearer limit.
    pub fn clamped(&self, now: DateTime<Utc>, max_days_lookback: i64, max_days_ahead: i64) -> Self {
        let floor = now - Duration::days(max_days_lookback);
        let ceil = now + Duration::days(max_days_ahead);
        let start = self.start.max(floor).min(ceil);
        let end = self.end.min(ceil).max(start);
        Self { start, end }
    }

    /// Calendar days covered by the window, from `start.date()` through
    /// `end.date()` inclusive. A zero-length window covers no days.
    pub fn days(&self) -> Vec<NaiveDate> {
        if self.start == self.end {
            return Vec::new();
        }
        let first = self.start.date_naive();
        let last = self.end.date_naive();
        let mut days = Vec::new();
        let mut current = first;
        while current <= last {
            days.push(current);
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        days
    }

    /// Number of calendar days covered by the window.
    pub fn day_count(&self) -> usize {
        if self.start == self.end {
            0
        } else {
            (self.end.date_naive() - self.start.date_naive()).num_days() as usize + 1
        }
    }

    /// Split the window into chained sub-windows of at most `days` days each.
    /// Each chunk ends exactly where the next begins, so the half-open
    /// semantics guarantee no instant is covered twice.
    pub fn chunks(&self, days: i64) -> Vec<DateWindow> {
        let mut windows = Vec::new();
        if days <= 0 {
            return windows;
        }
        let mut current = self.start;
        while current < self.end {
            let end = (current + Duration::days(days)).min(self.end);
            windows.push(DateWindow { start: current, end });
            current = end;
        }
        windows
    }
}

/// Minimal reference to a remote commit, as returned by a listing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRef {
    /// Commit identifier (SHA) on the remote.
    pub id: String,
    /// Author name as reported by the listing.
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// Enriched detail record for a single commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// An opaque unit of change carrying classification metadata. The metadata
/// only drives grouping decisions, never scheduling timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub path: String,
    pub kind: String,
    pub category: String,
    pub weight: u32,
}

/// One commit's worth of grouped work with its own timestamp.
///
/// The scheduler emits batch skeletons with empty `items`; the assigner fills
/// them and drops any skeleton that would stay empty, so every batch handed
/// to an executor carries at least one item. Batches are never mutated after
/// emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitBatch {
    pub timestamp: DateTime<Utc>,
    pub items: Vec<WorkItem>,
    pub label: String,
}

/// Per-author and per-day contribution counts for one aggregation.
///
/// Counters only ever increase; keys are inserted on first sight and never
/// removed. The struct also remembers where in the candidate set each author
/// first appeared, which gives `top_contributors` a stable tie-break that is
/// independent of fetch completion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContributionStats {
    pub total: u64,
    pub by_author: HashMap<String, u64>,
    pub by_day: BTreeMap<NaiveDate, u64>,
    #[serde(skip)]
    first_seen: HashMap<String, usize>,
}

impl ContributionStats {
    /// Fold one commit into the statistics. `candidate_index` is the commit's
    /// position in the candidate set, used only for tie-break ordering.
    pub fn record(&mut self, author: &str, day: NaiveDate, candidate_index: usize) {
        self.total += 1;
        *self.by_author.entry(author.to_string()).or_insert(0) += 1;
        *self.by_day.entry(day).or_insert(0) += 1;
        let slot = self
            .first_seen
            .entry(author.to_string())
            .or_insert(candidate_index);
        if candidate_index < *slot {
            *slot = candidate_index;
        }
    }

    /// Top `n` authors by commit count, descending. Equal counts are ordered
    /// by earliest first appearance in the candidate set, not alphabetically.
    pub fn top_contributors(&self, n: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> = self
            .by_author
            .iter()
            .map(|(author, count)| (author.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1).then_with(|| {
                let fa = self.first_seen.get(&a.0).copied().unwrap_or(usize::MAX);
                let fb = self.first_seen.get(&b.0).copied().unwrap_or(usize::MAX);
                fa.cmp(&fb)
            })
        });
        ranked.truncate(n);
        ranked
    }

    /// Number of distinct days that saw at least one commit.
    pub fn unique_commit_days(&self) -> usize {
        self.by_day.len()
    }

    /// Total commits divided by the number of commit-bearing days; 0 when no
    /// day has commits.
    pub fn average_commits_per_day(&self) -> f64 {
        let days = self.unique_commit_days();
        if days == 0 {
            0.0
        } else {
            self.total as f64 / days as f64
        }
    }
}
