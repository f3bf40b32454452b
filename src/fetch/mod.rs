//! # Remote Commit Fetching
//!
//! The `FetchClient` trait is the seam between the aggregation pipeline and
//! any remote commit-history source; `GithubClient` is the REST-backed
//! implementation. Retry policy for transient failures lives in `retry`.

mod client;
mod retry;

pub use client::{FetchClient, GithubClient};
pub use retry::{fetch_with_retry, RetryPolicy};
