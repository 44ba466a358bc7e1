//! Header metadata extraction.
//!
//! Parses the leading `# key: value` comment block of an EPS file and
//! reports where the body starts.

use crate::constants::METADATA_SEPARATOR;
use crate::models::Metadata;
use crate::normalizer::{LineKind, NormalizedLine};
use tracing::debug;

/// Result of scanning the header section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSection {
    pub metadata: Metadata,
    /// Header comments without a `key: value` shape, verbatim
    pub unclassified: Vec<String>,
    /// Number of normalized lines belonging to the header
    pub consumed: usize,
}

/// Extract metadata from the leading blank/comment lines
pub fn parse_header(lines: &[NormalizedLine]) -> HeaderSection {
    let mut section = HeaderSection::default();

    for line in lines {
        match line.kind {
            LineKind::Blank => {}
            LineKind::Comment => match parse_metadata_line(line.comment_body()) {
                Some((key, value)) => section.metadata.insert(key, value),
                None => section.unclassified.push(line.text.clone()),
            },
            LineKind::Data => break,
        }
        section.consumed += 1;
    }

    debug!(
        "Parsed header: {} metadata entries, {} unclassified, {} lines",
        section.metadata.len(),
        section.unclassified.len(),
        section.consumed
    );

    section
}

/// Split `key: value` once on the first separator
fn parse_metadata_line(body: &str) -> Option<(String, String)> {
    let (key, value) = body.split_once(METADATA_SEPARATOR)?;
    let key = key
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '(' | ')'))
        .trim();

    if key.is_empty() {
        return None;
    }

    Some((key.to_string(), value.trim().to_string()))
}
