//! Header variables shared by ITL and EVF timelines.
//!
//! `Ref_date:`, `Start_time:`, `End_time:` and friends may appear anywhere
//! in the body. Their raw tokens are collected during the pass and turned
//! into timestamps once the whole file has been read.

use crate::config::TimeFormat;
use crate::constants::header_fields;
use crate::error::{EpsError, Result};
use crate::models::{IncludeFile, Metadata};
use crate::normalizer::NormalizedLine;
use crate::time::{TimeResolver, parse_absolute};
use chrono::NaiveDateTime;
use std::path::Path;

/// Raw header variable tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineHeader {
    /// `(token, line)` of the reference date
    pub ref_date: Option<(String, usize)>,
    pub start_time: Option<(String, usize)>,
    pub end_time: Option<(String, usize)>,
    pub propagation_delay: Option<Vec<String>>,
    pub init_values: Vec<Vec<String>>,
    pub variables: Metadata,
}

impl TimelineHeader {
    /// Record a `Field:` line that is not a timed record.
    ///
    /// Header include declarations are pushed onto `includes`.
    pub fn accept(
        &mut self,
        key: &str,
        value: &[&str],
        line: &NormalizedLine,
        includes: &mut Vec<IncludeFile>,
    ) {
        let first = || value.first().map(|t| (t.to_string(), line.number));
        let owned = || value.iter().map(|t| t.to_string()).collect::<Vec<_>>();

        match key {
            header_fields::REF_DATE => self.ref_date = first(),
            header_fields::START_TIME => self.start_time = first(),
            header_fields::END_TIME => self.end_time = first(),
            header_fields::PROPAGATION_DELAY => self.propagation_delay = Some(owned()),
            header_fields::INIT_VALUE => self.init_values.push(owned()),
            header_fields::INCLUDE_FILE | header_fields::INCLUDE => {
                if let Some(include) =
                    IncludeFile::from_header_tokens(value, line.comment.clone(), line.number)
                {
                    includes.push(include);
                }
            }
            _ => self.variables.insert(key, value.join(" ")),
        }
    }

    pub fn raw_ref_date(&self) -> Option<&str> {
        self.ref_date.as_ref().map(|(t, _)| t.as_str())
    }

    pub fn raw_start_time(&self) -> Option<&str> {
        self.start_time.as_ref().map(|(t, _)| t.as_str())
    }

    pub fn raw_end_time(&self) -> Option<&str> {
        self.end_time.as_ref().map(|(t, _)| t.as_str())
    }

    /// Write the header variables in EPS syntax
    pub fn render(&self, includes: &[IncludeFile], out: &mut String) {
        if let Some(ref_date) = self.raw_ref_date() {
            out.push_str(&format!("{}: {}\n", header_fields::REF_DATE, ref_date));
        }
        if let Some(start) = self.raw_start_time() {
            out.push_str(&format!("{}: {}\n", header_fields::START_TIME, start));
        }
        if let Some(end) = self.raw_end_time() {
            out.push_str(&format!("{}: {}\n", header_fields::END_TIME, end));
        }
        if let Some(delay) = &self.propagation_delay {
            out.push_str(&format!(
                "{}: {}\n",
                header_fields::PROPAGATION_DELAY,
                delay.join(" ")
            ));
        }
        for value in &self.init_values {
            out.push_str(&format!("{}: {}\n", header_fields::INIT_VALUE, value.join(" ")));
        }
        for include in includes {
            let mut line = format!("{}: {}", header_fields::INCLUDE_FILE, include.quoted_name());
            if let Some(time) = &include.raw_time {
                line.push(' ');
                line.push_str(time);
            }
            for extra in &include.extra {
                line.push(' ');
                line.push_str(extra);
            }
            if let Some(comment) = &include.comment {
                line.push_str(" # ");
                line.push_str(comment);
            }
            out.push_str(&line);
            out.push('\n');
        }
        for (key, value) in self.variables.iter() {
            out.push_str(&format!("{}: {}\n", key, value));
        }
    }
}

/// Resolved times of a timeline document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineTimes {
    pub reference: Option<NaiveDateTime>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub resolver: TimeResolver,
}

impl TimelineTimes {
    /// Resolve the header times.
    ///
    /// `reference` replaces the file's own `Ref_date` when given.
    pub fn resolve(
        path: &Path,
        header: &TimelineHeader,
        format: TimeFormat,
        reference: Option<NaiveDateTime>,
    ) -> Result<Self> {
        let reference = match (reference, &header.ref_date) {
            (Some(reference), _) => Some(reference),
            (None, Some((token, line))) => {
                Some(parse_absolute(token).map_err(|e| EpsError::at(path, *line, e))?)
            }
            (None, None) => None,
        };

        let resolver = TimeResolver::new(format, reference);
        let resolve = |field: &Option<(String, usize)>| -> Result<Option<NaiveDateTime>> {
            field
                .as_ref()
                .map(|(token, line)| resolver.resolve(token).map_err(|e| EpsError::at(path, *line, e)))
                .transpose()
        };

        Ok(Self {
            reference,
            start: resolve(&header.start_time)?,
            end: resolve(&header.end_time)?,
            resolver,
        })
    }
}
