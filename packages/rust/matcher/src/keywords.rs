//! Keyword file loading.
//!
//! One keyword per line, lowercased. Blank lines and `#` comments are
//! skipped. Two optional modifiers are recognised:
//! - a trailing `-` requires a whole-word match (`nova-` does not hit "supernova")
//! - `not: a, b` lists phrases that veto the keyword when present

use std::path::Path;

use arxiv_digest_shared::{DigestError, Keyword, MatchMode, Result};
use tracing::debug;

/// Separator introducing exclusion phrases.
const EXCLUDE_MARKER: &str = "not:";

/// Read and parse the keyword file at `path`.
///
/// Fails with a config error if the file is missing or holds no keywords.
pub fn load_keywords(path: &Path) -> Result<Vec<Keyword>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DigestError::config(format!("{} not found", path.display()))
        } else {
            DigestError::io(path, e)
        }
    })?;

    let keywords = parse_keywords(&content).map_err(|_| {
        DigestError::config(format!("no keywords found in {}", path.display()))
    })?;

    debug!(path = %path.display(), count = keywords.len(), "loaded keywords");
    Ok(keywords)
}

/// Parse keyword text already in memory.
pub fn parse_keywords(content: &str) -> Result<Vec<Keyword>> {
    let keywords: Vec<Keyword> = content.lines().filter_map(parse_line).collect();

    if keywords.is_empty() {
        return Err(DigestError::config("no keywords found"));
    }
    Ok(keywords)
}

fn parse_line(line: &str) -> Option<Keyword> {
    let line = line.trim().to_lowercase();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (head, excludes) = match line.split_once(EXCLUDE_MARKER) {
        Some((head, rest)) => {
            let excludes = rest
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            (head.trim(), excludes)
        }
        None => (line.as_str(), Vec::new()),
    };

    let (text, mode) = match head.strip_suffix('-') {
        Some(stem) => (stem.trim_end(), MatchMode::Unique),
        None => (head, MatchMode::Any),
    };

    if text.is_empty() {
        return None;
    }

    Some(Keyword {
        text: text.to_string(),
        mode,
        excludes,
    })
}
