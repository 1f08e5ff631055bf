use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;
use crate::output::OutputFormat;
use crate::types::CommitEvent;

pub const ENV_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_COMMIT_MESSAGE: &str = "COMMIT_MESSAGE";
pub const ENV_COMMIT_AUTHOR: &str = "COMMIT_AUTHOR";
pub const ENV_COMMIT_URL: &str = "COMMIT_URL";
pub const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[command(name = "slack-commit-notifier")]
#[command(about = "Post commit notifications and a weekly commit leaderboard to Slack")]
#[command(version)]
pub struct Config {
    /// Operation to run: `notify` or `leaderboard`
    #[arg(value_name = "MODE", default_value = "notify")]
    #[serde(skip)]
    pub mode: String,

    /// Configuration file path
    #[arg(short, long)]
    #[serde(skip)]
    pub config_file: Option<String>,

    /// Print the message instead of posting it to Slack
    #[arg(long, default_value_t = false)]
    #[serde(skip)]
    pub dry_run: bool,

    /// Dry-run output format
    #[arg(long, value_parser = OutputFormat::from_str)]
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// GitHub API base URL
    #[arg(long)]
    #[serde(default)]
    pub api_base: Option<String>,

    /// What to do when the GitHub API answers with an error status
    #[arg(long, value_parser = ApiErrorPolicy::from_str)]
    #[serde(default)]
    pub api_error: Option<ApiErrorPolicy>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    #[serde(skip)]
    pub verbose: bool,
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context("Failed to read configuration file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML configuration file")?;

        Ok(config)
    }

    /// Applies the config file named by `--config-file`, if any.
    pub fn load(self) -> Result<Self> {
        match self.config_file.clone() {
            Some(path) => {
                let file_config = Config::from_toml(&path)
                    .with_context(|| format!("Failed to load configuration from {path}"))?;
                Ok(self.merge(file_config))
            }
            None => Ok(self),
        }
    }

    pub fn merge(mut self, file_config: Config) -> Self {
        // CLI has precedence, if None, take from file_config
        self.format = self.format.or(file_config.format);
        self.timeout_secs = self.timeout_secs.or(file_config.timeout_secs);
        self.api_base = self.api_base.or(file_config.api_base);
        self.api_error = self.api_error.or(file_config.api_error);
        self
    }

    pub fn get_format(&self) -> OutputFormat {
        self.format.clone().unwrap_or_default()
    }

    pub fn get_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn get_api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn get_api_error(&self) -> ApiErrorPolicy {
        self.api_error.unwrap_or_default()
    }
}

/// Handling of a non-success status from the GitHub commits endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiErrorPolicy {
    /// Abort the run.
    #[default]
    Fail,
    /// Log and continue as if no commits were found.
    Empty,
}

impl fmt::Display for ApiErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorPolicy::Fail => write!(f, "fail"),
            ApiErrorPolicy::Empty => write!(f, "empty"),
        }
    }
}

impl FromStr for ApiErrorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(ApiErrorPolicy::Fail),
            "empty" => Ok(ApiErrorPolicy::Empty),
            _ => anyhow::bail!("Invalid api error policy '{}'. Use 'fail' or 'empty'", s),
        }
    }
}

/// `owner/name` repository identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for Repository {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Repository {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(Error::Configuration(format!(
                "{ENV_REPOSITORY} must look like 'owner/name', got '{s}'"
            ))),
        }
    }
}

/// Settings for the `notify` mode, read once from the environment.
#[derive(Clone, Debug)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
    pub event: CommitEvent,
}

impl NotifyConfig {
    pub fn from_lookup<F>(lookup: F, require_webhook: bool) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(NotifyConfig {
            webhook_url: webhook_url(&lookup, require_webhook)?,
            event: CommitEvent::new(
                lookup(ENV_COMMIT_AUTHOR),
                lookup(ENV_COMMIT_MESSAGE),
                lookup(ENV_COMMIT_URL),
            ),
        })
    }
}

/// Settings for the `leaderboard` mode, read once from the environment.
#[derive(Clone)]
pub struct LeaderboardConfig {
    pub webhook_url: Option<String>,
    pub repository: Repository,
    pub token: String,
}

// Keeps the token out of debug logs.
impl fmt::Debug for LeaderboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaderboardConfig")
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "<set>"))
            .field("repository", &self.repository)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl LeaderboardConfig {
    pub fn from_lookup<F>(lookup: F, require_webhook: bool) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_url = webhook_url(&lookup, require_webhook)?;
        let repository: Repository = required(&lookup, ENV_REPOSITORY)?.parse()?;
        let token = required(&lookup, ENV_TOKEN)?;
        Ok(LeaderboardConfig {
            webhook_url,
            repository,
            token,
        })
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String, Error>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::missing_var(name))
}

fn webhook_url<F>(lookup: &F, require: bool) -> Result<Option<String>, Error>
where
    F: Fn(&str) -> Option<String>,
{
    if require {
        required(lookup, ENV_WEBHOOK_URL).map(Some)
    } else {
        Ok(lookup(ENV_WEBHOOK_URL))
    }
}

/// Reads variables from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
