//! # Configuration
//!
//! Explicitly constructed configuration values, loaded from TOML or built in
//! code and passed into the scheduler and aggregator. There is deliberately
//! no process-wide settings singleton; two aggregations in the same process
//! can run with different configs.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GitPulseError, Result};
use crate::schedule::{ActiveHours, ScheduleConstraints};
use crate::types::DateWindow;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub schedule: ScheduleConfig,
    pub window: WindowConfig,
    pub fetch: FetchConfig,
}

/// External scheduling surface. `frequency` is a 0-100 integer percentage
/// here; it is normalized to a [0, 1] fraction before it reaches the
/// scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub frequency: u32,
    pub max_commits_per_day: u32,
    pub min_commits_per_day: u32,
    pub exclude_weekends: bool,
    pub active_hours: ActiveHours,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            frequency: 80,
            max_commits_per_day: 10,
            min_commits_per_day: 0,
            exclude_weekends: false,
            active_hours: ActiveHours::default(),
        }
    }
}

/// How the date window is derived and bounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Days before "now" the window starts.
    pub days_before: i64,
    /// Days after "now" the window ends.
    pub days_after: i64,
    pub max_days_lookback: i64,
    pub max_days_ahead: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            days_before: 30,
            days_after: 0,
            max_days_lookback: 365,
            max_days_ahead: 30,
        }
    }
}

/// Remote-fetch behavior for the aggregation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub max_concurrent_requests: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 500,
            // Leave headroom for other work, same sizing as local task pools.
            max_concurrent_requests: (num_cpus::get() * 3 / 4).max(1),
            user_agent: format!("gitpulse/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the external surface before any normalization happens.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.frequency > 100 {
            return Err(GitPulseError::Config(format!(
                "frequency must be a 0-100 percentage, got {}",
                self.schedule.frequency
            )));
        }
        if self.window.days_before < 0 || self.window.days_after < 0 {
            return Err(GitPulseError::Config(
                "days_before and days_after must be non-negative".to_string(),
            ));
        }
        if self.fetch.max_concurrent_requests == 0 {
            return Err(GitPulseError::Config(
                "max_concurrent_requests must be positive".to_string(),
            ));
        }
        if self.fetch.request_timeout_secs == 0 {
            return Err(GitPulseError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        // Constraint-level invariants (max >= min, bounds positive, active
        // hours well-formed) are checked again by the scheduler itself.
        self.constraints().map(|_| ())
    }

    /// Normalize the external surface into scheduler constraints.
    pub fn constraints(&self) -> Result<ScheduleConstraints> {
        let constraints = ScheduleConstraints {
            frequency: f64::from(self.schedule.frequency.min(100)) / 100.0,
            max_commits_per_day: self.schedule.max_commits_per_day,
            min_commits_per_day: self.schedule.min_commits_per_day,
            exclude_weekends: self.schedule.exclude_weekends,
            active_hours: self.schedule.active_hours,
        };
        constraints.validate()?;
        Ok(constraints)
    }

    /// Build the date window anchored on `now`, clamped against the
    /// configured lookback/lookahead limits.
    pub fn window_anchored(&self, now: DateTime<Utc>) -> Result<DateWindow> {
        let window = DateWindow::anchored(now, self.window.days_before, self.window.days_after)?;
        Ok(window.clamped(now, self.window.max_days_lookback, self.window.max_days_ahead))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn frequency_percent_normalizes_to_fraction() {
        let mut config = AppConfig::default();
        config.schedule.frequency = 80;
        let constraints = config.constraints().unwrap();
        assert_eq!(constraints.frequency, 0.8);
    }

    #[test]
    fn frequency_over_100_is_rejected() {
        let mut config = AppConfig::default();
        config.schedule.frequency = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml() {
        let raw = r#"
            [schedule]
            frequency = 50
            max_commits_per_day = 4
            exclude_weekends = true

            [fetch]
            max_retries = 1
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.schedule.frequency, 50);
        assert_eq!(config.schedule.max_commits_per_day, 4);
        assert!(config.schedule.exclude_weekends);
        assert_eq!(config.fetch.max_retries, 1);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.window.days_before, 30);
    }

    #[test]
    fn anchored_window_is_clamped() {
        let mut config = AppConfig::default();
        config.window.days_before = 500;
        config.window.max_days_lookback = 365;
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let window = config.window_anchored(now).unwrap();
        assert_eq!(window.start(), now - chrono::Duration::days(365));
        assert_eq!(window.end(), now);
    }
}
