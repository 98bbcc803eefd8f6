//! Core domain types for arxiv-digest: keywords, feed entries, matches, reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Keyword
// ---------------------------------------------------------------------------

/// How a keyword is compared against an entry's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Substring anywhere in the lowercased title + abstract.
    #[default]
    Any,
    /// Must equal one whole (punctuation-stripped) word.
    Unique,
}

/// A single lowercased search keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    /// Lowercased keyword text, as shown in reports.
    pub text: String,
    /// Comparison mode.
    #[serde(default)]
    pub mode: MatchMode,
    /// Lowercased phrases that veto this keyword when present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl Keyword {
    /// A plain substring keyword. The text is trimmed and lowercased.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_lowercase(),
            mode: MatchMode::Any,
            excludes: Vec::new(),
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One paper listing as fetched from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Feed identifier with the `/abs/` prefix removed (e.g. `2504.17688v1`).
    pub id: String,
    /// Title with inner whitespace collapsed.
    pub title: String,
    /// Abstract text.
    pub summary: String,
    /// Canonical abstract page URL.
    pub url: String,
    /// Publication date (time of day discarded).
    pub published: NaiveDate,
}

// ---------------------------------------------------------------------------
// Match / Report
// ---------------------------------------------------------------------------

/// An entry together with the keywords it matched, in keyword-list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub entry: Entry,
    pub keywords: Vec<String>,
}

impl Match {
    /// Publication date of the underlying entry.
    pub fn date(&self) -> NaiveDate {
        self.entry.published
    }
}

/// Matches restricted to the newest publication date, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pub matches: Vec<Match>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
