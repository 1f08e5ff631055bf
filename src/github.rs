use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, header};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{ApiErrorPolicy, ENV_TOKEN, Repository};
use crate::error::{Error, Result};

static USER_AGENT: &str = concat!("slack-commit-notifier/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    client: Client,
    base: String,
    on_error: ApiErrorPolicy,
}

impl GitHubClient {
    pub fn new(token: &str, base: &str, timeout: Duration, on_error: ApiErrorPolicy) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        let mut auth = header::HeaderValue::from_str(&format!("token {token}"))
            .map_err(|_| Error::Configuration(format!("{ENV_TOKEN} contains invalid characters")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(GitHubClient {
            client,
            base: base.trim_end_matches('/').to_string(),
            on_error,
        })
    }

    /// Lists commits made since `since`, as raw JSON records.
    ///
    /// Only the first page is requested, so results beyond the API's default
    /// page size are dropped. A successful body that is not an array yields
    /// no commits.
    pub async fn commits_since(&self, repo: &Repository, since: DateTime<Utc>) -> Result<Vec<Value>> {
        let url = format!("{}/repos/{}/{}/commits", self.base, repo.owner, repo.name);
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        debug!(%url, %since, "fetching commits");

        let resp = self
            .client
            .get(&url)
            .query(&[("since", since.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return match self.on_error {
                ApiErrorPolicy::Fail => Err(Error::HostingApi { status, body }),
                ApiErrorPolicy::Empty => {
                    warn!(%status, %body, "GitHub API error, treating as no commits");
                    Ok(Vec::new())
                }
            };
        }

        match resp.json::<Value>().await? {
            Value::Array(items) => {
                debug!(count = items.len(), "fetched commit records");
                Ok(items)
            }
            other => {
                warn!(body = %other, "commit list response is not an array, treating as no commits");
                Ok(Vec::new())
            }
        }
    }
}
