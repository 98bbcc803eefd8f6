//! Turning a matcher outcome into a chat message body.

use arxiv_digest_matcher::FeedClient;
use arxiv_digest_shared::{MatcherConfig, Result};
use tracing::warn;

/// Message body used when the matcher succeeds but prints nothing.
pub const NO_RESULTS: &str = "No matching arXiv papers found.";

/// Prefix of the message body when the matcher fails.
pub const MATCHER_ERROR_HEADER: &str = "*Error running matcher:*";

/// Run the matcher and return the text to post.
///
/// Never fails: any error in this stage, including building the feed
/// client, becomes the message itself so that the failure is visible in
/// the channel.
pub async fn obtain_report_text(config: &MatcherConfig) -> String {
    let outcome = async {
        let client = FeedClient::new(config.timeout_secs)?;
        arxiv_digest_matcher::run(&client, config).await
    }
    .await;
    report_text(outcome)
}

/// Map a matcher outcome to message text.
pub fn report_text(outcome: Result<String>) -> String {
    match outcome {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                NO_RESULTS.to_string()
            } else {
                text.to_string()
            }
        }
        Err(e) => {
            warn!(error = %e, "matcher failed, forwarding diagnostic");
            format!("{MATCHER_ERROR_HEADER}\n{e}")
        }
    }
}

/// Insert a blank line after every keyword line (`[...]`).
pub fn add_paragraph_breaks(text: &str) -> String {
    let mut lines = Vec::new();
    for line in text.lines() {
        lines.push(line);
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            lines.push("");
        }
    }
    lines.join("\n")
}
