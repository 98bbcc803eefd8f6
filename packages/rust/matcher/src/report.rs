//! Plain-text rendering of a [`Report`].

use arxiv_digest_shared::Report;

/// Emitted in place of a report when nothing matched.
pub const NO_MATCHES: &str = "No matching papers found.";

/// Render three lines per match, or [`NO_MATCHES`] for an empty report.
///
/// ```text
/// 2504.17688v1 : The Hubble Image Similarity Project
///   http://arxiv.org/abs/2504.17688v1
///  [hubble]
/// ```
pub fn render(report: &Report) -> String {
    if report.is_empty() {
        return NO_MATCHES.to_string();
    }

    let mut lines = Vec::with_capacity(report.len() * 3);
    for m in report {
        lines.push(format!("{} : {}", m.entry.id, m.entry.title));
        lines.push(format!("  {}", m.entry.url));
        lines.push(format!(" [{}]", m.keywords.join(", ")));
    }
    lines.join("\n")
}
