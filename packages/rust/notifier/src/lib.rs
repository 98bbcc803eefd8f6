//! Slack notifier for arXiv keyword digests.
//!
//! A run is strictly linear: obtain the report text from the matcher,
//! add paragraph breaks, then deliver it once to the webhook. Matcher
//! failures are posted as the message body; delivery failures are returned.

mod format;
mod slack;

use arxiv_digest_shared::{AppConfig, Result};
use tracing::{info, instrument};

pub use format::{
    MATCHER_ERROR_HEADER, NO_RESULTS, add_paragraph_breaks, obtain_report_text, report_text,
};
pub use slack::{SlackClient, SlackPayload};

/// Options for a single notify run.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyOptions {
    /// Build the message but return it instead of posting it.
    pub dry_run: bool,
}

/// What a notify run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The message was accepted by the webhook.
    Posted { channel: String },
    /// Dry run: the message that would have been posted.
    DryRun { message: String },
}

/// Run the full obtain → format → deliver sequence.
///
/// The webhook URL is validated before any network activity, except for
/// dry runs, which never post.
#[instrument(skip_all, fields(dry_run = opts.dry_run))]
pub async fn notify(config: &AppConfig, opts: NotifyOptions) -> Result<NotifyOutcome> {
    let webhook = if opts.dry_run {
        None
    } else {
        Some(config.slack.require_webhook()?)
    };

    let raw = obtain_report_text(&config.matcher).await;
    let message = add_paragraph_breaks(&raw);

    let Some(webhook_url) = webhook else {
        info!("dry run, not posting");
        return Ok(NotifyOutcome::DryRun { message });
    };

    let slack = SlackClient::new(webhook_url, config.slack.timeout_secs)?;
    slack
        .deliver(&SlackPayload::new(&message, &config.slack))
        .await?;

    info!(channel = %config.slack.channel, "posted digest");
    Ok(NotifyOutcome::Posted {
        channel: config.slack.channel.clone(),
    })
}
