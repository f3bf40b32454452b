//! # Commit Activity Synthesis and Analysis Library
//!
//! `gitpulse` plans synthetic commit activity and analyzes real contribution
//! history. It provides two core subsystems:
//!
//! - a deterministic **scheduler** that partitions a date window into dated
//!   commit batches under activity constraints (frequency, per-day bounds,
//!   weekend policy), with a grouping layer that assigns work items to
//!   batches, and
//! - a concurrent **aggregator** that lists commits from a remote source,
//!   enriches each with a detail fetch under a concurrency bound, and folds
//!   the results into per-author and per-day statistics, tolerating
//!   individual fetch failures.
//!
//! Materializing batches as real commits is left to an external executor;
//! this crate only guarantees batch grouping and timing.
//!
//! ## Example
//!
//! ```no_run
//! use gitpulse::{schedule, DateWindow, ScheduleConstraints};
//! use gitpulse::schedule::ActiveHours;
//! use chrono::{TimeZone, Utc};
//!
//! let window = DateWindow::new(
//!     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
//! ).unwrap();
//! let constraints = ScheduleConstraints {
//!     frequency: 0.8,
//!     max_commits_per_day: 5,
//!     min_commits_per_day: 0,
//!     exclude_weekends: true,
//!     active_hours: ActiveHours::default(),
//! };
//! let batches = schedule(&window, &constraints, Some(42)).unwrap();
//! // The day loop covers end.date() inclusively, so batches land on the
//! // window's calendar days; the last day's timestamps can sit past the
//! // half-open end instant.
//! let days = window.days();
//! assert!(batches.iter().all(|b| days.contains(&b.timestamp.date_naive())));
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod schedule;
pub mod types;

// Re-export main types for convenience
pub use aggregate::{AggregateOutcome, Aggregator, SkippedCommit};
pub use config::AppConfig;
pub use error::{FetchError, GitPulseError, Result};
pub use fetch::{FetchClient, GithubClient};
pub use schedule::{assign, schedule, ScheduleConstraints};
pub use types::{CommitBatch, CommitRecord, CommitRef, ContributionStats, DateWindow, WorkItem};
