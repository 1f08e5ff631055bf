use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::slack::WebhookPayload;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Default,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Default => write!(f, "default"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(OutputFormat::Default),
            "json" => Ok(OutputFormat::Json),
            _ => anyhow::bail!("Invalid format '{}'. Use 'default' or 'json'", s),
        }
    }
}

/// Renders a message the way a dry run shows it.
pub fn render(format: &OutputFormat, text: &str) -> Result<String> {
    match format {
        OutputFormat::Default => Ok(text.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&WebhookPayload { text })?),
    }
}

pub fn print_output(format: &OutputFormat, text: &str) -> Result<()> {
    println!("{}", render(format, text)?);
    Ok(())
}
