use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod github;
mod leaderboard;
mod notify;
mod output;
mod slack;
mod types;

#[cfg(test)]
mod test_support;

use config::{Config, LeaderboardConfig, NotifyConfig};
use error::Error;
use github::GitHubClient;
use slack::SlackWebhook;
use types::TimeWindow;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(config.verbose);

    let config = config.load()?;
    debug!(?config, "effective configuration");

    run(&config, config::process_env).await
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatches on the mode, reading per-run settings through `lookup`.
async fn run<F>(config: &Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let require_webhook = !config.dry_run;
    match config.mode.as_str() {
        "notify" => {
            let settings = NotifyConfig::from_lookup(lookup, require_webhook)?;
            info!(author = %settings.event.author, "sending commit notification");
            let text = notify::format_notification(&settings.event);
            deliver(config, settings.webhook_url.as_deref(), &text)
                .await
                .context("Failed to send commit notification")
        }
        "leaderboard" => {
            let settings = LeaderboardConfig::from_lookup(lookup, require_webhook)?;
            let window = TimeWindow::trailing_week();
            info!(repository = %settings.repository, since = %window.start, "building commit leaderboard");
            let client = GitHubClient::new(
                &settings.token,
                config.get_api_base(),
                config.get_timeout(),
                config.get_api_error(),
            )?;
            let text = leaderboard::build_message(&client, &settings.repository, &window)
                .await
                .with_context(|| format!("Failed to fetch commits for {}", settings.repository))?;
            deliver(config, settings.webhook_url.as_deref(), &text)
                .await
                .context("Failed to send leaderboard")
        }
        other => {
            println!("Unknown mode: {other}");
            Ok(())
        }
    }
}

async fn deliver(config: &Config, webhook_url: Option<&str>, text: &str) -> Result<()> {
    if config.dry_run {
        return output::print_output(&config.get_format(), text);
    }
    let url = webhook_url.ok_or_else(|| Error::missing_var(config::ENV_WEBHOOK_URL))?;
    SlackWebhook::new(url, config.get_timeout())?.send(text).await?;
    Ok(())
}
