//! Line normalization.
//!
//! Turns physical lines into logical lines: continuation lines are merged,
//! comments are isolated and whitespace runs collapse to single spaces.
//! Every physical line that took part in a merge is kept as a [`Fragment`]
//! so readers can attach per-line comments (ITL parameter comments).

use crate::constants::{COMMENT_MARKER, CONTINUATION_MARKER};

/// Shape of a logical line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Data,
}

/// Contribution of one physical line to a logical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine {
    /// 1-based number of the first physical line
    pub number: usize,
    /// Collapsed text; for comment lines this includes the leading marker
    pub text: String,
    pub comment: Option<String>,
    pub fragments: Vec<Fragment>,
    pub kind: LineKind,
}

impl NormalizedLine {
    pub fn is_blank(&self) -> bool {
        self.kind == LineKind::Blank
    }

    pub fn is_comment(&self) -> bool {
        self.kind == LineKind::Comment
    }

    pub fn is_data(&self) -> bool {
        self.kind == LineKind::Data
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    /// Comment line text without its leading marker(s)
    pub fn comment_body(&self) -> &str {
        self.text.trim_start_matches(COMMENT_MARKER).trim()
    }
}

/// Normalize the full content of a file
pub fn normalize(content: &str) -> Vec<NormalizedLine> {
    let mut normalizer = Normalizer::default();
    for (index, raw) in content.lines().enumerate() {
        normalizer.push(index + 1, raw);
    }
    normalizer.finish()
}

#[derive(Default)]
struct Normalizer {
    out: Vec<NormalizedLine>,
    pending: Vec<Fragment>,
    pending_start: usize,
}

impl Normalizer {
    fn push(&mut self, number: usize, raw: &str) {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            self.flush();
            self.out.push(NormalizedLine {
                number,
                text: String::new(),
                comment: None,
                fragments: Vec::new(),
                kind: LineKind::Blank,
            });
            return;
        }

        if trimmed.starts_with(COMMENT_MARKER) {
            self.flush();
            let text = collapse(trimmed);
            let body = text.trim_start_matches(COMMENT_MARKER).trim();
            let comment = (!body.is_empty()).then(|| body.to_string());
            self.out.push(NormalizedLine {
                number,
                fragments: vec![Fragment {
                    text: text.clone(),
                    comment: comment.clone(),
                }],
                text,
                comment,
                kind: LineKind::Comment,
            });
            return;
        }

        if self.pending.is_empty() {
            self.pending_start = number;
        }

        match find_continuation(raw) {
            Some(index) => {
                let after = &raw[index + CONTINUATION_MARKER.len_utf8()..];
                self.pending.push(Fragment {
                    text: collapse(&raw[..index]),
                    comment: comment_text(after),
                });
            }
            None => {
                let (text, comment) = match raw.find(COMMENT_MARKER) {
                    Some(index) => (&raw[..index], comment_text(&raw[index..])),
                    None => (raw, None),
                };
                self.pending.push(Fragment {
                    text: collapse(text),
                    comment,
                });
                self.flush();
            }
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let fragments = std::mem::take(&mut self.pending);
        let text = collapse(
            &fragments
                .iter()
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
        let comments: Vec<&str> = fragments
            .iter()
            .filter_map(|f| f.comment.as_deref())
            .collect();
        let comment = (!comments.is_empty()).then(|| comments.join(" "));

        self.out.push(NormalizedLine {
            number: self.pending_start,
            text,
            comment,
            fragments,
            kind: LineKind::Data,
        });
    }

    fn finish(mut self) -> Vec<NormalizedLine> {
        self.flush();
        self.out
    }
}

/// Byte index of the first live continuation marker.
///
/// A doubled marker is an escaped literal and the scan stops at the first
/// comment marker.
fn find_continuation(raw: &str) -> Option<usize> {
    let mut chars = raw.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        match c {
            COMMENT_MARKER => return None,
            CONTINUATION_MARKER => {
                if matches!(chars.peek(), Some((_, CONTINUATION_MARKER))) {
                    chars.next();
                } else {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Trimmed comment text with a leading marker removed, `None` when empty
fn comment_text(raw: &str) -> Option<String> {
    let text = raw.trim();
    let text = text.strip_prefix(COMMENT_MARKER).unwrap_or(text).trim();
    (!text.is_empty()).then(|| collapse(text))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
