//! # Contribution Aggregation
//!
//! Bounded-concurrency fetch/enrich/reduce pipeline. One listing call
//! produces the candidate set; detail fetches fan out under a semaphore and
//! feed a single reducer task that owns the accumulator, so counter updates
//! are serialized even though fetches are concurrent. A commit whose detail
//! fetch ultimately fails is dropped from the statistics and recorded; the
//! aggregation as a whole only fails when the candidate set cannot be listed.


use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::config::FetchConfig;
use crate::error::{GitPulseError, Result};
use crate::fetch::{fetch_with_retry, FetchClient, RetryPolicy};
use crate::types::{CommitRecord, ContributionStats, DateWindow};

/// A commit dropped from the statistics after its detail fetch failed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedCommit {
    pub id: String,
    pub error: String,
}

/// Result of one aggregation call: the statistics over the successfully
/// fetched subset, plus the commits that had to be skipped.
#[derive(Debug, Serialize)]
pub struct AggregateOutcome {
    pub stats: ContributionStats,
    pub skipped: Vec<SkippedCommit>,
}

enum FetchOutcome {
    Fetched { index: usize, record: CommitRecord },
    Skipped { id: String, error: String },
}

/// Orchestrates fetch-client calls into contribution statistics.
pub struct Aggregator<C: FetchClient> {
    client: Arc<C>,
    concurrency_limit: usize,
    per_call_timeout: Duration,
    retry: RetryPolicy,
}

impl<C: FetchClient + 'static> Aggregator<C> {
    pub fn new(client: C, config: &FetchConfig) -> Self {
        Self {
            client: Arc::new(client),
            concurrency_limit: config.max_concurrent_requests.max(1),
            per_call_timeout: config.request_timeout(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: config.retry_delay(),
            },
        }
    }

    /// Aggregate contribution statistics over the window.
    ///
    /// The candidate set comes from a single `list_commits` call; its failure
    /// fails the whole aggregation. At most `max_concurrent_requests` detail
    /// fetches are in flight at any time. The returned statistics are
    /// invariant to fetch completion order.
    pub async fn aggregate(&self, window: &DateWindow) -> Result<AggregateOutcome> {
        let candidates = self
            .client
            .list_commits(window)
            .await
            .map_err(GitPulseError::CandidateSet)?;
        info!(candidates = candidates.len(), "aggregating contribution window");

        // Single-writer discipline: the reducer task exclusively owns the
        // accumulator and is the only point that touches the counts.
        let (tx, mut rx) = mpsc::channel::<FetchOutcome>(64);
        let reducer = tokio::spawn(async move {
            let mut stats = ContributionStats::default();
            let mut skipped = Vec::new();
            while let Some(outcome) = rx.recv().await {
                match outcome {
                    FetchOutcome::Fetched { index, record } => {
                        stats.record(&record.author, record.timestamp.date_naive(), index);
                    }
                    FetchOutcome::Skipped { id, error } => {
                        skipped.push(SkippedCommit { id, error });
                    }
                }
            }
            (stats, skipped)
        });

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut handles = Vec::with_capacity(candidates.len());

        for (index, commit) in candidates.into_iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| GitPulseError::Task(format!("failed to acquire semaphore: {e}")))?;
            let client = self.client.clone();
            let tx = tx.clone();
            let retry = self.retry;
            let per_call_timeout = self.per_call_timeout;

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome =
                    match fetch_with_retry(client.as_ref(), &commit, &retry, per_call_timeout)
                        .await
                    {
                        Ok(record) => FetchOutcome::Fetched { index, record },
                        Err(err) => {
                            warn!(id = %commit.id, error = %err, "dropping commit from statistics");
                            FetchOutcome::Skipped {
                                id: commit.id,
                                error: err.to_string(),
                            }
                        }
                    };
                // The reducer only goes away once every sender is dropped,
                // so a send failure means the aggregation itself was
                // cancelled.
                let _ = tx.send(outcome).await;
            }));
        }
        drop(tx);

        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "detail fetch task failed");
            }
        }

        let (stats, skipped) = reducer
            .await
            .map_err(|e| GitPulseError::Task(format!("reducer task failed: {e}")))?;
        info!(
            total = stats.total,
            authors = stats.by_author.len(),
            skipped = skipped.len(),
            "aggregation complete"
        );
        Ok(AggregateOutcome { stats, skipped })
    }

    /// Top `n` contributors over the window: a pure post-processing step on
    /// the aggregated statistics, no re-fetching.
    pub async fn top_contributors(
        &self,
        window: &DateWindow,
        n: usize,
    ) -> Result<Vec<(String, u64)>> {
        let outcome = self.aggregate(window).await?;
        Ok(outcome.stats.top_contributors(n))
    }
}
