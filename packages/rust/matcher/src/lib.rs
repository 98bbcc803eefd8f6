//! Keyword matcher for arXiv listings.
//!
//! Loads a keyword list, fetches the newest entries for a set of categories,
//! keeps entries whose title or abstract mentions a keyword, narrows them to
//! the newest publication date and renders a plain-text report.

mod feed;
mod keywords;
mod matching;
mod report;

use arxiv_digest_shared::{MatcherConfig, Result};
use tracing::{info, instrument};

pub use feed::{FeedClient, FeedQuery, paper_id, parse_feed, parse_published};
pub use keywords::{load_keywords, parse_keywords};
pub use matching::{find_matches, keyword_matches, select_newest};
pub use report::{NO_MATCHES, render};

/// Run the whole matcher: keywords → fetch → match → newest date → text.
///
/// Any failure aborts the run; no partial report is produced.
#[instrument(skip_all, fields(keywords = %config.keywords_path.display()))]
pub async fn run(client: &FeedClient, config: &MatcherConfig) -> Result<String> {
    let keywords = load_keywords(&config.keywords_path)?;
    let entries = client.fetch_entries(&FeedQuery::from(config)).await?;

    let matches = find_matches(&entries, &keywords);
    let report = select_newest(matches);

    info!(
        entries = entries.len(),
        keywords = keywords.len(),
        reported = report.len(),
        "matching complete"
    );

    Ok(render(&report))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use arxiv_digest_shared::DigestError;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(feed_url: String, keywords: &str) -> MatcherConfig {
        MatcherConfig {
            keywords_path: PathBuf::from(format!("../../../fixtures/keywords/{keywords}")),
            feed_url,
            ..MatcherConfig::default()
        }
    }

    #[tokio::test]
    async fn run_reports_newest_matches() {
        let server = MockServer::start().await;
        let feed = std::fs::read_to_string("../../../fixtures/arxiv/sample-feed.xml")
            .expect("read fixture");

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed))
            .mount(&server)
            .await;

        let client = FeedClient::new(5).unwrap();
        let text = run(&client, &config(server.uri(), "astro_key.txt")).await.unwrap();

        assert_eq!(
            text,
            "2504.17688v1 : The Hubble Image Similarity Project\n  \
             http://arxiv.org/abs/2504.17688v1\n \
             [hubble]\n\
             2504.17500v1 : Gravitational Wave Echoes from Hubble-Scale Voids\n  \
             http://arxiv.org/abs/2504.17500v1\n \
             [hubble, gravitational wave]"
        );
    }

    #[tokio::test]
    async fn run_without_matches_renders_sentinel() {
        let server = MockServer::start().await;
        let feed = std::fs::read_to_string("../../../fixtures/arxiv/sample-feed.xml")
            .expect("read fixture");

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let kw_path = dir.path().join("keywords.txt");
        std::fs::write(&kw_path, "magnetar\n").unwrap();

        let mut cfg = config(server.uri(), "astro_key.txt");
        cfg.keywords_path = kw_path;

        let client = FeedClient::new(5).unwrap();
        let text = run(&client, &cfg).await.unwrap();
        assert_eq!(text, NO_MATCHES);
    }

    #[tokio::test]
    async fn missing_keywords_fail_before_fetching() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = FeedClient::new(5).unwrap();
        let err = run(&client, &config(server.uri(), "does-not-exist.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::Config { .. }));
    }
}
