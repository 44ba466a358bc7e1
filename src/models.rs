//! Core data structures shared by the EDF, ITL and EVF readers.
//!
//! Defines the file kinds, the ordered metadata map, include-file
//! references and ITL action parameters.

use crate::constants::{COMMENT_MARKER, EDF_EXTENSION, EVF_EXTENSION, ITL_EXTENSION};
use crate::error::{EpsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// EPS file kinds supported by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    Edf,
    Itl,
    Evf,
}

impl FileKind {
    /// Detect file kind from the extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();

        match extension.as_str() {
            EDF_EXTENSION => Some(FileKind::Edf),
            ITL_EXTENSION => Some(FileKind::Itl),
            EVF_EXTENSION => Some(FileKind::Evf),
            _ => None,
        }
    }

    /// Like `from_path`, failing with `UnsupportedFormat`
    pub fn detect(path: &Path) -> Result<Self> {
        Self::from_path(path).ok_or_else(|| EpsError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Edf => EDF_EXTENSION,
            FileKind::Itl => ITL_EXTENSION,
            FileKind::Evf => EVF_EXTENSION,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

/// Insertion-ordered `key -> value` map with unique keys.
///
/// A repeated key replaces the earlier value in place, keeping its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a mandatory key
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| EpsError::MissingHeaderField {
            field: key.to_string(),
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where an include reference was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeOrigin {
    /// `Include_file:` / `Include:` header variable
    Header,
    /// `<time> INCLUDE "file"` timeline directive
    Timeline,
}

/// Reference to another planning file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeFile {
    /// File name with surrounding quotes removed
    pub file_name: String,
    /// Time offset token, resolved against the including document
    pub raw_time: Option<String>,
    /// Tokens following the file name and offset, kept verbatim
    pub extra: Vec<String>,
    pub comment: Option<String>,
    pub origin: IncludeOrigin,
    pub line: usize,
}

impl IncludeFile {
    /// Build from the tokens after an `Include_file:` key.
    ///
    /// The second token is taken as time offset only when it looks like a
    /// time token.
    pub fn from_header_tokens(
        tokens: &[&str],
        comment: Option<String>,
        line: usize,
    ) -> Option<Self> {
        let (first, rest) = tokens.split_first()?;
        let (raw_time, extra) = match rest.split_first() {
            Some((candidate, tail)) if crate::time::is_time_token(candidate) => {
                (Some(candidate.to_string()), tail)
            }
            _ => (None, rest),
        };

        Some(Self {
            file_name: unquote(first),
            raw_time,
            extra: extra.iter().map(|s| s.to_string()).collect(),
            comment,
            origin: IncludeOrigin::Header,
            line,
        })
    }

    /// Build from a timeline directive `<time> INCLUDE "file" [extra...]`
    pub fn from_directive(
        raw_time: &str,
        file_token: &str,
        extra: &[&str],
        comment: Option<String>,
        line: usize,
    ) -> Self {
        Self {
            file_name: unquote(file_token),
            raw_time: Some(raw_time.to_string()),
            extra: extra.iter().map(|s| s.to_string()).collect(),
            comment,
            origin: IncludeOrigin::Timeline,
            line,
        }
    }

    /// File name as written in EPS files (always quoted)
    pub fn quoted_name(&self) -> String {
        format!("\"{}\"", self.file_name)
    }
}

/// Strip one layer of surrounding double or single quotes
pub fn unquote(token: &str) -> String {
    token
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

/// A named action parameter, `(NAME = v1 v2 # comment)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    pub values: Vec<String>,
    pub comment: Option<String>,
}

impl ActionParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            comment: None,
        }
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// `NAME = v1 v2`, without the comment
    pub fn assignment(&self) -> String {
        if self.values.is_empty() {
            format!("{} =", self.name)
        } else {
            format!("{} = {}", self.name, self.values.join(" "))
        }
    }

    /// `NAME = v1 v2 # comment`, or the bare assignment without a comment
    pub fn annotated(&self) -> String {
        match &self.comment {
            Some(comment) => format!("{} {} {}", self.assignment(), COMMENT_MARKER, comment),
            None => self.assignment(),
        }
    }
}

/// Table cell rendering of a parameter list: annotated assignments joined by `, `
pub fn render_parameters(parameters: &[ActionParameter]) -> Option<String> {
    if parameters.is_empty() {
        return None;
    }

    Some(
        parameters
            .iter()
            .map(ActionParameter::annotated)
            .collect::<Vec<_>>()
            .join(", "),
    )
}
