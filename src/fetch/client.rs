use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::error::{FetchError, GitPulseError, Result};
use crate::types::{CommitRecord, CommitRef, DateWindow};

const GITHUB_API: &str = "https://api.github.com";

/// Interface to a remote commit-history source.
///
/// Implementations must tolerate `fetch_detail` being called concurrently
/// from multiple tasks for distinct refs; any internal mutable state needs
/// its own synchronization.
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// List the commits falling inside the window.
    async fn list_commits(
        &self,
        window: &DateWindow,
    ) -> std::result::Result<Vec<CommitRef>, FetchError>;

    /// Fetch the detail record for one listed commit.
    async fn fetch_detail(
        &self,
        commit: &CommitRef,
    ) -> std::result::Result<CommitRecord, FetchError>;
}

/// `FetchClient` backed by the GitHub REST API.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    owner: String,
    name: String,
}

impl GithubClient {
    /// Build a client for the repository at `repo_url`. A `GITHUB_TOKEN`
    /// environment variable, when present, is sent as an auth header.
    pub fn new(repo_url: &str, config: &FetchConfig) -> Result<Self> {
        Self::with_base_url(repo_url, config, GITHUB_API)
    }

    fn with_base_url(repo_url: &str, config: &FetchConfig, base_url: &str) -> Result<Self> {
        let (owner, name) = parse_repo_url(repo_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        if let Ok(agent) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, agent);
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if let Ok(value) = HeaderValue::from_str(&format!("token {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GitPulseError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(%owner, %name, "fetch client ready");
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            owner,
            name,
        })
    }
}

/// Extract `(owner, name)` from a repository URL or `owner/name` shorthand.
fn parse_repo_url(repo_url: &str) -> Result<(String, String)> {
    let mut parts = repo_url.trim_end_matches('/').rsplit('/');
    let name = parts.next().unwrap_or_default();
    let owner = parts.next().unwrap_or_default();
    // A hostname in the owner position means the URL had no owner segment.
    if owner.is_empty() || name.is_empty() || owner.contains(':') || owner.contains('.') {
        return Err(GitPulseError::Parse(format!(
            "cannot extract owner/name from repository URL '{repo_url}'"
        )));
    }
    Ok((owner.to_string(), name.trim_end_matches(".git").to_string()))
}

// Only the fields the aggregator consumes; the rest of the API schema is
// ignored on decode.
#[derive(Deserialize)]
struct WireCommit {
    sha: String,
    commit: WirePayload,
}

#[derive(Deserialize)]
struct WirePayload {
    author: WireAuthor,
    message: String,
}

#[derive(Deserialize)]
struct WireAuthor {
    name: Option<String>,
    date: DateTime<Utc>,
}

fn classify_status(status: StatusCode, url: &str) -> FetchError {
    if status == StatusCode::NOT_FOUND {
        FetchError::NotFound(url.to_string())
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        FetchError::Transient(format!("status {status} from {url}"))
    } else {
        FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl FetchClient for GithubClient {
    async fn list_commits(
        &self,
        window: &DateWindow,
    ) -> std::result::Result<Vec<CommitRef>, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/commits",
            self.base_url, self.owner, self.name
        );
        let response = self
            .http
            .get(&url)
            .query(&[
                ("since", window.start().to_rfc3339()),
                ("until", window.end().to_rfc3339()),
                ("per_page", "100".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, &url));
        }

        let commits: Vec<WireCommit> = response.json().await?;
        debug!(count = commits.len(), "listed commits");
        Ok(commits
            .into_iter()
            .filter(|c| window.contains(c.commit.author.date))
            .map(|c| CommitRef {
                id: c.sha,
                author: c.commit.author.name.unwrap_or_else(|| "Unknown".to_string()),
                timestamp: c.commit.author.date,
            })
            .collect())
    }

    async fn fetch_detail(
        &self,
        commit: &CommitRef,
    ) -> std::result::Result<CommitRecord, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.base_url, self.owner, self.name, commit.id
        );
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, &url));
        }

        let detail: WireCommit = response.json().await?;
        Ok(CommitRecord {
            id: detail.sha,
            author: detail
                .commit
                .author
                .name
                .unwrap_or_else(|| "Unknown".to_string()),
            timestamp: detail.commit.author.date,
            message: detail.commit.message,
        })
    }
}
