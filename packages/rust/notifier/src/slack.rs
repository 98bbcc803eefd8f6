//! Slack incoming-webhook delivery.

use std::time::Duration;

use arxiv_digest_shared::{DigestError, Result, SlackConfig, error_chain};
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, instrument};
use url::Url;

/// User-Agent string for webhook requests.
const USER_AGENT: &str = concat!("arxiv-digest/", env!("CARGO_PKG_VERSION"));

/// JSON body accepted by Slack incoming webhooks.
#[derive(Debug, Serialize)]
pub struct SlackPayload<'a> {
    pub channel: &'a str,
    pub username: &'a str,
    pub icon_emoji: &'a str,
    pub text: &'a str,
}

impl<'a> SlackPayload<'a> {
    /// Payload addressed per `config` carrying `text`.
    pub fn new(text: &'a str, config: &'a SlackConfig) -> Self {
        Self {
            channel: &config.channel,
            username: &config.username,
            icon_emoji: &config.icon_emoji,
            text,
        }
    }
}

/// Posts messages to a single webhook URL.
pub struct SlackClient {
    client: Client,
    webhook_url: Url,
}

impl SlackClient {
    /// Create a client for `webhook_url` with the given request timeout.
    pub fn new(webhook_url: Url, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DigestError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, webhook_url))
    }

    /// Create a SlackClient around an existing reqwest Client.
    pub fn with_client(client: Client, webhook_url: Url) -> Self {
        Self {
            client,
            webhook_url,
        }
    }

    /// POST `payload` once. Any non-2xx answer is a delivery error
    /// carrying the status code and response body.
    #[instrument(skip_all, fields(channel = payload.channel))]
    pub async fn deliver(&self, payload: &SlackPayload<'_>) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                DigestError::Network(format!(
                    "webhook request failed: {}",
                    error_chain(&e.without_url())
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %body, "Slack API error");
            return Err(DigestError::Delivery {
                status: status.as_u16(),
                body,
            });
        }

        info!(status = status.as_u16(), "message delivered");
        Ok(())
    }
}
