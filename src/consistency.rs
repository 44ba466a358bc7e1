//! Consistency checks over parsed documents.
//!
//! Two checks exist: event times against the declared
//! `Start_time`/`End_time` window, and existence of included files next to
//! the including document. Both report warnings by default; the time check
//! has a fatal form for strict validation.

use crate::config::ParserConfig;
use crate::document::ParsedDocument;
use crate::error::{EpsError, Result};
use crate::evf::EvfDocument;
use crate::itl::ItlDocument;
use crate::models::IncludeFile;
use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A document with timed events and an optional validity window
pub trait Timeline {
    fn source_path(&self) -> &Path;
    fn window(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>);
    /// `(raw_time, time)` of every event
    fn event_times(&self) -> Vec<(&str, NaiveDateTime)>;
}

impl Timeline for ItlDocument {
    fn source_path(&self) -> &Path {
        self.path()
    }

    fn window(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        (self.start_time(), self.end_time())
    }

    fn event_times(&self) -> Vec<(&str, NaiveDateTime)> {
        self.events
            .iter()
            .map(|e| (e.raw_time.as_str(), e.time))
            .collect()
    }
}

impl Timeline for EvfDocument {
    fn source_path(&self) -> &Path {
        self.path()
    }

    fn window(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        (self.start_time(), self.end_time())
    }

    fn event_times(&self) -> Vec<(&str, NaiveDateTime)> {
        self.events
            .iter()
            .map(|e| (e.raw_time.as_str(), e.time))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

impl Bound {
    fn field(&self) -> &'static str {
        match self {
            Bound::Start => "Start_time",
            Bound::End => "End_time",
        }
    }

    fn relation(&self) -> &'static str {
        match self {
            Bound::Start => "before",
            Bound::End => "after",
        }
    }
}

/// An event outside the declared window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundsViolation {
    pub raw_time: String,
    pub time: NaiveDateTime,
    pub bound: Bound,
    pub limit: NaiveDateTime,
}

impl BoundsViolation {
    pub fn into_error(self) -> EpsError {
        EpsError::TimeOutOfRange {
            raw_time: self.raw_time,
            time: self.time,
            relation: self.bound.relation(),
            bound: self.bound.field(),
            limit: self.limit,
        }
    }
}

impl fmt::Display for BoundsViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event at {} ({}) is {} {} {}",
            self.time,
            self.raw_time,
            self.bound.relation(),
            self.bound.field(),
            self.limit
        )
    }
}

/// An include reference with no file behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingInclude {
    pub source: PathBuf,
    pub file_name: String,
    pub resolved: PathBuf,
    pub line: usize,
}

impl MissingInclude {
    pub fn new(source: &Path, include: &IncludeFile, resolved: PathBuf) -> Self {
        Self {
            source: source.to_path_buf(),
            file_name: include.file_name.clone(),
            resolved,
            line: include.line,
        }
    }
}

impl fmt::Display for MissingInclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}) is not in the same directory as {}",
            self.file_name,
            self.line,
            self.source.display()
        )
    }
}

/// Every event outside the declared window, in event order
pub fn time_bound_violations<T: Timeline + ?Sized>(doc: &T) -> Vec<BoundsViolation> {
    let (start, end) = doc.window();
    let mut violations = Vec::new();

    for (raw_time, time) in doc.event_times() {
        let violated = match (start, end) {
            (Some(start), _) if time < start => Some((Bound::Start, start)),
            (_, Some(end)) if time > end => Some((Bound::End, end)),
            _ => None,
        };
        if let Some((bound, limit)) = violated {
            violations.push(BoundsViolation {
                raw_time: raw_time.to_string(),
                time,
                bound,
                limit,
            });
        }
    }

    violations
}

/// Fail on the first event outside the declared window
pub fn check_time_bounds<T: Timeline + ?Sized>(doc: &T) -> Result<()> {
    match time_bound_violations(doc).into_iter().next() {
        Some(violation) => Err(violation.into_error()),
        None => Ok(()),
    }
}

/// Directory include references are resolved against
pub fn source_directory(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Includes that cannot be found next to `source`; never fails
pub fn check_includes_exist(source: &Path, includes: &[IncludeFile]) -> Vec<MissingInclude> {
    let directory = source_directory(source);

    includes
        .iter()
        .filter_map(|include| {
            let resolved = directory.join(&include.file_name);
            if resolved.is_file() {
                None
            } else {
                let missing = MissingInclude::new(source, include, resolved);
                warn!("Missing include: {}", missing);
                Some(missing)
            }
        })
        .collect()
}

/// Combined result of all checks on one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub path: PathBuf,
    pub violations: Vec<BoundsViolation>,
    pub missing_includes: Vec<MissingInclude>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.missing_includes.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.violations.len() + self.missing_includes.len()
    }
}

/// Run every check that applies to the document's kind.
///
/// Out-of-window events are fatal only with `strict_time_bounds`.
pub fn check_document(doc: &ParsedDocument, config: &ParserConfig) -> Result<ConsistencyReport> {
    let violations = match doc {
        ParsedDocument::Edf(_) => Vec::new(),
        ParsedDocument::Itl(itl) => time_bound_violations(itl),
        ParsedDocument::Evf(evf) => time_bound_violations(evf),
    };

    if config.strict_time_bounds {
        if let Some(violation) = violations.first() {
            return Err(violation.clone().into_error());
        }
    }
    for violation in &violations {
        warn!("{}: {}", doc.path().display(), violation);
    }

    Ok(ConsistencyReport {
        path: doc.path().to_path_buf(),
        violations,
        missing_includes: check_includes_exist(doc.path(), doc.includes()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncludeOrigin;
    use std::fs;
    use tempfile::TempDir;

    fn include(name: &str) -> IncludeFile {
        IncludeFile {
            file_name: name.to_string(),
            raw_time: None,
            extra: Vec::new(),
            comment: None,
            origin: IncludeOrigin::Header,
            line: 3,
        }
    }

    #[test]
    fn test_missing_include_reported_once() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("root.itl");
        fs::write(&source, "").unwrap();
        fs::write(temp_dir.path().join("present.itl"), "").unwrap();

        let missing =
            check_includes_exist(&source, &[include("present.itl"), include("missing.itl")]);

        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].file_name, "missing.itl");
        assert_eq!(missing[0].resolved, temp_dir.path().join("missing.itl"));
        assert!(missing[0].to_string().contains("missing.itl"));
    }

    #[test]
    fn test_source_directory_of_bare_file_name() {
        assert_eq!(source_directory(Path::new("plan.itl")), PathBuf::from("."));
        assert_eq!(source_directory(Path::new("a/b.itl")), PathBuf::from("a"));
    }

    #[test]
    fn test_time_bounds() {
        let content = "Ref_date: 01-Jan-2024\nStart_time: 001_00:00:00\nEnd_time: 002_00:00:00\n\
                       000_12:00:00 MAG ON\n001_12:00:00 MAG OFF\n003_00:00:00 MAG ON\n";
        let doc = ItlDocument::parse_str(content, &ParserConfig::default()).unwrap();

        let violations = time_bound_violations(&doc);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].bound, Bound::Start);
        assert_eq!(violations[0].raw_time, "000_12:00:00");
        assert_eq!(violations[1].bound, Bound::End);

        match check_time_bounds(&doc) {
            Err(EpsError::TimeOutOfRange { relation, bound, .. }) => {
                assert_eq!(relation, "before");
                assert_eq!(bound, "Start_time");
            }
            other => panic!("expected TimeOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_no_window_no_violations() {
        let content = "Ref_date: 01-Jan-2024\n000_12:00:00 MAG ON\n";
        let doc = ItlDocument::parse_str(content, &ParserConfig::default()).unwrap();
        assert!(time_bound_violations(&doc).is_empty());
        assert!(check_time_bounds(&doc).is_ok());
    }
}
