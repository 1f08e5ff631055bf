use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by the notifier and leaderboard operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required setting is missing or invalid.
    #[error("Configuration: {0}")]
    Configuration(String),

    /// The Slack webhook answered with something other than 200.
    #[error("Slack request failed: {status}, {body}")]
    Delivery { status: StatusCode, body: String },

    /// The GitHub API answered with a non-success status.
    #[error("GitHub API request failed: {status}, {body}")]
    HostingApi { status: StatusCode, body: String },

    /// Transport failure or an undecodable response body.
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn missing_var(name: &str) -> Self {
        Error::Configuration(format!("environment variable {name} is not set"))
    }
}

/// A commit record that lacks the author metadata needed for ranking.
///
/// Never fatal: extraction logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("commit {sha} is missing {missing}")]
pub struct MalformedCommit {
    pub sha: String,
    pub missing: &'static str,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_mentions_status() {
        let err = Error::Delivery {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("500"), "got: {text}");
        assert!(text.contains("boom"));
    }

    #[test]
    fn test_missing_var_names_the_variable() {
        let err = Error::missing_var("GITHUB_TOKEN");
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }
}
