//! arXiv query API client and Atom feed parser.

use std::time::Duration;

use arxiv_digest_shared::{DigestError, Entry, MatcherConfig, Result, error_chain};
use chrono::NaiveDateTime;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

/// User-Agent string for feed requests.
const USER_AGENT: &str = concat!("arxiv-digest/", env!("CARGO_PKG_VERSION"));

/// Timestamp format of `<published>`.
const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Path segment preceding the paper identifier in an entry id URL.
const ABS_SEGMENT: &str = "/abs/";

/// Marker in the id of the pseudo-entry arXiv returns for a bad query.
const API_ERROR_MARKER: &str = "/api/errors";

// ---------------------------------------------------------------------------
// FeedQuery
// ---------------------------------------------------------------------------

/// A "newest N submissions in these categories" query.
#[derive(Debug, Clone)]
pub struct FeedQuery {
    /// Query API endpoint.
    pub base_url: String,
    /// Category codes, OR-ed together.
    pub categories: Vec<String>,
    /// Maximum number of entries requested.
    pub max_results: u32,
}

impl FeedQuery {
    /// The `search_query` expression, e.g. `(cat:astro-ph.GA OR cat:astro-ph.CO)`.
    pub fn search_expression(&self) -> String {
        let cats: Vec<String> = self.categories.iter().map(|c| format!("cat:{c}")).collect();
        format!("({})", cats.join(" OR "))
    }

    /// Full request URL, sorted by submission date, newest first.
    pub fn url(&self) -> Result<Url> {
        if self.categories.is_empty() {
            return Err(DigestError::config("no feed categories configured"));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            DigestError::config(format!("invalid feed URL '{}': {e}", self.base_url))
        })?;

        url.query_pairs_mut()
            .append_pair("search_query", &self.search_expression())
            .append_pair("sortBy", "submittedDate")
            .append_pair("sortOrder", "descending")
            .append_pair("max_results", &self.max_results.to_string());

        Ok(url)
    }
}

impl From<&MatcherConfig> for FeedQuery {
    fn from(config: &MatcherConfig) -> Self {
        Self {
            base_url: config.feed_url.clone(),
            categories: config.categories.clone(),
            max_results: config.max_results,
        }
    }
}

// ---------------------------------------------------------------------------
// FeedClient
// ---------------------------------------------------------------------------

/// Fetches and parses listings from the arXiv query API.
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Create a client with the given request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout_secs)?))
    }

    /// Create a FeedClient around an existing reqwest Client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the newest entries matching `query`.
    ///
    /// Zero entries is treated as a fetch failure, the same as a
    /// transport error or a non-2xx status.
    #[instrument(skip_all, fields(max_results = query.max_results))]
    pub async fn fetch_entries(&self, query: &FeedQuery) -> Result<Vec<Entry>> {
        let url = query.url()?;
        info!(%url, "querying arXiv");

        let endpoint = endpoint_label(&url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                DigestError::fetch(format!("{endpoint}: {}", error_chain(&e.without_url())))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::fetch(format!("{endpoint}: HTTP {status}")));
        }

        let body = response.bytes().await.map_err(|e| {
            DigestError::fetch(format!(
                "{endpoint}: failed to read body: {}",
                error_chain(&e.without_url())
            ))
        })?;

        let entries = parse_feed(&body)?;
        if entries.is_empty() {
            return Err(DigestError::fetch(
                "no entries returned from arXiv; check network or query URL",
            ));
        }

        info!(count = entries.len(), "fetched entries");
        Ok(entries)
    }
}

/// `host[:port]/path` of a request URL, without the long query string.
fn endpoint_label(url: &Url) -> String {
    let host = url.host_str().unwrap_or("unknown-host");
    match url.port() {
        Some(port) => format!("{host}:{port}{}", url.path()),
        None => format!("{host}{}", url.path()),
    }
}

/// Build a reqwest client with appropriate settings.
fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DigestError::Network(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Atom parsing
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
}

#[derive(Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    alternate: Option<String>,
    first_link: Option<String>,
}

impl EntryBuilder {
    fn push_text(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Id => &mut self.id,
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
            Field::Published => &mut self.published,
        };
        target.push_str(text);
    }

    fn add_link(&mut self, link: &BytesStart<'_>) -> Result<()> {
        let Some(href) = attribute(link, b"href")? else {
            return Ok(());
        };
        let rel = attribute(link, b"rel")?;

        if matches!(rel.as_deref(), None | Some("alternate")) && self.alternate.is_none() {
            self.alternate = Some(href.clone());
        }
        if self.first_link.is_none() {
            self.first_link = Some(href);
        }
        Ok(())
    }

    fn build(self, index: usize) -> Result<Entry> {
        let raw_id = self.id.trim();
        if raw_id.is_empty() {
            return Err(DigestError::parse(format!("entry {index} has no <id>")));
        }
        if raw_id.contains(API_ERROR_MARKER) {
            return Err(DigestError::fetch(format!(
                "arXiv rejected the query: {}",
                self.summary.trim()
            )));
        }

        let title = collapse_whitespace(&self.title);
        if title.is_empty() {
            return Err(DigestError::parse(format!("entry {raw_id} has no <title>")));
        }

        let published = parse_published(&self.published).map_err(|e| match e {
            DigestError::Parse { message } => DigestError::parse(format!("entry {raw_id}: {message}")),
            other => other,
        })?;

        let url = self
            .alternate
            .or(self.first_link)
            .unwrap_or_else(|| raw_id.to_string());

        Ok(Entry {
            id: paper_id(raw_id).to_string(),
            title,
            summary: self.summary.trim().to_string(),
            url,
            published,
        })
    }
}

/// Parse an arXiv Atom document into entries, in document order.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<Entry>> {
    // Text is kept raw and normalized per field in `EntryBuilder::build`,
    // so fragments split by comments or CDATA keep their spacing.
    let mut reader = Reader::from_reader(xml);

    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut current: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"entry" => current = Some(EntryBuilder::default()),
                b"link" => {
                    if let Some(builder) = current.as_mut() {
                        builder.add_link(&e)?;
                    }
                }
                name if current.is_some() => field = field_for(name),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"link" {
                    if let Some(builder) = current.as_mut() {
                        builder.add_link(&e)?;
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"entry" {
                    if let Some(builder) = current.take() {
                        entries.push(builder.build(entries.len())?);
                    }
                }
                field = None;
            }
            Ok(Event::Text(e)) => {
                if let (Some(builder), Some(f)) = (current.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map_err(|e| DigestError::parse(format!("bad text in feed: {e}")))?;
                    builder.push_text(f, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(builder), Some(f)) = (current.as_mut(), field) {
                    builder.push_text(f, &String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DigestError::parse(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if current.is_some() {
        return Err(DigestError::parse("feed ended inside an <entry>"));
    }

    debug!(count = entries.len(), "parsed Atom feed");
    Ok(entries)
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"id" => Some(Field::Id),
        b"title" => Some(Field::Title),
        b"summary" => Some(Field::Summary),
        b"published" => Some(Field::Published),
        _ => None,
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    let attr = element
        .try_get_attribute(key)
        .map_err(|e| DigestError::parse(format!("bad attribute in feed: {e}")))?;

    attr.map(|a| {
        a.unescape_value()
            .map(|v| v.into_owned())
            .map_err(|e| DigestError::parse(format!("bad attribute value in feed: {e}")))
    })
    .transpose()
}

/// Everything after the last `/abs/` of an entry id URL.
pub fn paper_id(id_url: &str) -> &str {
    id_url.rsplit(ABS_SEGMENT).next().unwrap_or(id_url)
}

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` timestamp, keeping only the date.
pub fn parse_published(raw: &str) -> Result<chrono::NaiveDate> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, PUBLISHED_FORMAT)
        .map(|dt| dt.date())
        .map_err(|e| DigestError::parse(format!("invalid published timestamp '{raw}': {e}")))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn read_fixture(name: &str) -> String {
        std::fs::read_to_string(format!("../../../fixtures/arxiv/{name}")).expect("read fixture")
    }

    fn query(base_url: String) -> FeedQuery {
        FeedQuery {
            base_url,
            categories: vec!["astro-ph.GA".into(), "astro-ph.CO".into()],
            max_results: 25,
        }
    }

    #[test]
    fn search_expression_ors_categories() {
        let q = query("http://export.arxiv.org/api/query".into());
        assert_eq!(q.search_expression(), "(cat:astro-ph.GA OR cat:astro-ph.CO)");
    }

    #[test]
    fn url_carries_sort_and_cap() {
        let q = query("http://export.arxiv.org/api/query".into());
        let url = q.url().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("search_query".into(), "(cat:astro-ph.GA OR cat:astro-ph.CO)".into()),
                ("sortBy".into(), "submittedDate".into()),
                ("sortOrder".into(), "descending".into()),
                ("max_results".into(), "25".into()),
            ]
        );
        assert!(url.as_str().starts_with("http://export.arxiv.org/api/query?"));
    }

    #[test]
    fn url_without_categories_is_config_error() {
        let mut q = query("http://export.arxiv.org/api/query".into());
        q.categories.clear();
        assert!(matches!(q.url(), Err(DigestError::Config { .. })));
    }

    #[test]
    fn query_from_default_config() {
        let q = FeedQuery::from(&MatcherConfig::default());
        assert_eq!(q.max_results, 1000);
        assert!(q.search_expression().starts_with("(cat:astro-ph.GA OR "));
        assert!(q.search_expression().ends_with("cat:astro-ph.SR)"));
    }

    #[test]
    fn paper_id_takes_last_abs_segment() {
        assert_eq!(paper_id("http://arxiv.org/abs/2504.17688v1"), "2504.17688v1");
        assert_eq!(paper_id("http://arxiv.org/abs/astro-ph/0601001v2"), "astro-ph/0601001v2");
        assert_eq!(paper_id("no-abs-here"), "no-abs-here");
    }

    #[test]
    fn published_keeps_date_only() {
        assert_eq!(
            parse_published("2025-04-24T17:59:58Z").unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 24).unwrap()
        );
        assert!(matches!(
            parse_published("24 Apr 2025"),
            Err(DigestError::Parse { .. })
        ));
    }

    #[test]
    fn parse_sample_fixture() {
        let entries = parse_feed(read_fixture("sample-feed.xml").as_bytes()).unwrap();
        assert_eq!(entries.len(), 4);

        let first = &entries[0];
        assert_eq!(first.id, "2504.17688v1");
        assert_eq!(first.title, "The Hubble Image Similarity Project");
        assert_eq!(first.url, "http://arxiv.org/abs/2504.17688v1");
        assert_eq!(first.published, NaiveDate::from_ymd_opt(2025, 4, 24).unwrap());
        assert!(first.summary.starts_with("We present"));

        // Multi-line titles are collapsed, entities unescaped.
        assert_eq!(entries[1].title, "Dust & Gas in Nearby Galaxies");
    }

    #[test]
    fn parse_empty_feed_yields_no_entries() {
        let entries = parse_feed(read_fixture("empty-feed.xml").as_bytes()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn bad_timestamp_is_parse_error() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry>
            <id>http://arxiv.org/abs/2504.00001v1</id>
            <title>T</title><summary>S</summary>
            <published>yesterday</published>
        </entry></feed>"#;
        let err = parse_feed(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, DigestError::Parse { .. }));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn text_split_by_comment_or_cdata_keeps_spacing() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry>
            <id>http://arxiv.org/abs/2504.00002v1</id>
            <title>Dark <![CDATA[Matter]]> Halos</title>
            <summary>S <!-- c --> more</summary>
            <published>2025-04-01T00:00:00Z</published>
        </entry></feed>"#;
        let entries = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(entries[0].title, "Dark Matter Halos");
        let words: Vec<&str> = entries[0].summary.split_whitespace().collect();
        assert_eq!(words, vec!["S", "more"]);
    }

    #[test]
    fn endpoint_label_drops_query() {
        let q = query("http://127.0.0.1:9/api/query".into());
        assert_eq!(endpoint_label(&q.url().unwrap()), "127.0.0.1:9/api/query");
        let q = query("http://export.arxiv.org/api/query".into());
        assert_eq!(endpoint_label(&q.url().unwrap()), "export.arxiv.org/api/query");
    }

    #[test]
    fn link_falls_back_to_id() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry>
            <id>http://arxiv.org/abs/2504.00001v1</id>
            <title>T</title><summary>S</summary>
            <published>2025-04-01T00:00:00Z</published>
        </entry></feed>"#;
        let entries = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(entries[0].url, "http://arxiv.org/abs/2504.00001v1");
    }

    #[test]
    fn api_error_entry_is_fetch_error() {
        let err = parse_feed(read_fixture("api-error.xml").as_bytes()).unwrap_err();
        assert!(matches!(err, DigestError::Fetch(_)));
        assert!(err.to_string().contains("incorrect id format"));
    }

    #[test]
    fn truncated_document_is_parse_error() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><id>x</id>"#;
        assert!(matches!(
            parse_feed(xml.as_bytes()),
            Err(DigestError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn fetch_entries_from_mock_server() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("search_query", "(cat:astro-ph.GA OR cat:astro-ph.CO)"))
            .and(query_param("sortBy", "submittedDate"))
            .and(query_param("sortOrder", "descending"))
            .and(query_param("max_results", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_string(read_fixture("sample-feed.xml")))
            .expect(1)
            .mount(&server)
            .await;

        let client = FeedClient::new(5).unwrap();
        let entries = client
            .fetch_entries(&query(format!("{}/api/query", server.uri())))
            .await
            .unwrap();
        assert_eq!(entries.len(), 4);
    }

    #[tokio::test]
    async fn fetch_empty_feed_is_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(read_fixture("empty-feed.xml")))
            .mount(&server)
            .await;

        let client = FeedClient::new(5).unwrap();
        let err = client
            .fetch_entries(&query(server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::Fetch(_)));
        assert!(err.to_string().contains("no entries"));
    }

    #[tokio::test]
    async fn fetch_server_error_is_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = FeedClient::new(5).unwrap();
        let err = client
            .fetch_entries(&query(server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn unreachable_feed_is_fetch_error() {
        let client = FeedClient::new(2).unwrap();
        // Port 9 (discard) on localhost is not listening in test environments.
        let err = client
            .fetch_entries(&query("http://127.0.0.1:9/api/query".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::Fetch(_)));

        let msg = err.to_string();
        assert!(msg.to_lowercase().contains("connection refused"), "got: {msg}");
        assert!(!msg.contains("search_query"), "got: {msg}");
    }
}
