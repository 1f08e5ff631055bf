use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::MalformedCommit;

pub const DEFAULT_AUTHOR: &str = "Unknown";
pub const DEFAULT_MESSAGE: &str = "No message";

const WINDOW_DAYS: i64 = 7;

/// A commit that just landed, as described by the CI environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    pub author: String,
    pub message: String,
    pub url: String,
}

impl CommitEvent {
    /// Missing or blank author/message fall back to placeholders.
    pub fn new(author: Option<String>, message: Option<String>, url: Option<String>) -> Self {
        Self {
            author: non_blank(author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            message: non_blank(message).unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            url: url.unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// GitHub commit list item. Everything is optional so a bad record can be
// reported instead of failing the whole response.
#[derive(Debug, Deserialize)]
pub struct CommitRecord {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub commit: Option<CommitMeta>,
}

#[derive(Debug, Deserialize)]
pub struct CommitMeta {
    #[serde(default)]
    pub author: Option<AuthorMeta>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorMeta {
    #[serde(default)]
    pub name: Option<String>,
}

impl CommitRecord {
    /// Parses one list item. Items of the wrong shape become a record with
    /// no commit metadata.
    pub fn from_value(raw: &Value) -> Self {
        serde_json::from_value(raw.clone()).unwrap_or_else(|_| CommitRecord {
            sha: raw.get("sha").and_then(Value::as_str).map(str::to_string),
            commit: None,
        })
    }

    pub fn author_name(&self) -> Result<&str, MalformedCommit> {
        let malformed = |missing| MalformedCommit {
            sha: self.sha.clone().unwrap_or_else(|| "<unknown>".to_string()),
            missing,
        };
        let commit = self.commit.as_ref().ok_or_else(|| malformed("commit"))?;
        let author = commit.author.as_ref().ok_or_else(|| malformed("commit.author"))?;
        author
            .name
            .as_deref()
            .ok_or_else(|| malformed("commit.author.name"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub author: String,
    pub count: usize,
}

/// The trailing window `[end - 7 days, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn ending_at(end: DateTime<Utc>) -> Self {
        Self {
            start: end - Duration::days(WINDOW_DAYS),
            end,
        }
    }

    pub fn trailing_week() -> Self {
        Self::ending_at(Utc::now())
    }
}
