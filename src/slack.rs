use reqwest::{Client, StatusCode, header};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Body accepted by Slack incoming webhooks.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub text: &'a str,
}

pub struct SlackWebhook {
    client: Client,
    url: String,
}

impl SlackWebhook {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(SlackWebhook {
            client,
            url: url.into(),
        })
    }

    /// Posts `text` to the webhook. Anything but 200 is a delivery error.
    pub async fn send(&self, text: &str) -> Result<()> {
        debug!(bytes = text.len(), "posting message to slack webhook");
        let resp = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&WebhookPayload { text })
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Delivery { status, body });
        }
        info!("slack message delivered");
        Ok(())
    }
}
