//! Keyword matching and newest-date selection.

use arxiv_digest_shared::{Entry, Keyword, Match, MatchMode, Report};

/// Characters stripped from both ends of a word for whole-word matching.
const WORD_PUNCTUATION: &[char] = &['"', ':', '.', ',', '!', '?'];

/// Pair every entry with the keywords found in its title and abstract.
///
/// Entries with no matching keyword are dropped. Feed order is preserved,
/// and each match lists its keywords in keyword-list order.
pub fn find_matches(entries: &[Entry], keywords: &[Keyword]) -> Vec<Match> {
    entries
        .iter()
        .filter_map(|entry| {
            let haystack = format!("{} {}", entry.title, entry.summary).to_lowercase();
            let matched: Vec<String> = keywords
                .iter()
                .filter(|kw| keyword_matches(kw, &haystack))
                .map(|kw| kw.text.clone())
                .collect();

            (!matched.is_empty()).then(|| Match {
                entry: entry.clone(),
                keywords: matched,
            })
        })
        .collect()
}

/// Whether `keyword` hits the already-lowercased `haystack`.
pub fn keyword_matches(keyword: &Keyword, haystack: &str) -> bool {
    if keyword.excludes.iter().any(|ex| haystack.contains(ex.as_str())) {
        return false;
    }

    match keyword.mode {
        MatchMode::Any => haystack.contains(keyword.text.as_str()),
        MatchMode::Unique => haystack
            .split_whitespace()
            .map(|word| word.trim_matches(WORD_PUNCTUATION))
            .any(|word| word == keyword.text),
    }
}

/// Keep only the matches published on the newest date among them.
///
/// Ties are all kept, in their original order. Empty input gives an empty report.
pub fn select_newest(matches: Vec<Match>) -> Report {
    let Some(newest) = matches.iter().map(Match::date).max() else {
        return Report::default();
    };

    Report {
        matches: matches.into_iter().filter(|m| m.date() == newest).collect(),
    }
}
