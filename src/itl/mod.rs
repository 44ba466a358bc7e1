//! ITL (Interleaved Timeline) documents.
//!
//! An ITL file holds a header block of timeline variables followed by
//! timed instrument actions. Included timelines are kept as references
//! and folded in by [`ItlDocument::merge_includes`].
//!
//! ## Architecture
//!
//! - [`details`] - timed line tokenizer and action parameter reader
//! - [`merge`] - depth-first include merging into a [`MergedTimeline`]
//! - [`writer`] - ITL text output

pub mod details;
pub mod merge;
pub mod writer;

#[cfg(test)]
mod tests;

pub use merge::{MergedEvent, MergedTimeline};

use crate::config::ParserConfig;
use crate::document::read_source;
use crate::error::{EpsError, Result};
use crate::header::parse_header;
use crate::models::{ActionParameter, IncludeFile, Metadata, render_parameters};
use crate::normalizer::{LineKind, normalize};
use crate::reader::parse_field;
use crate::schema::TableSchema;
use crate::table::RectangularTable;
use crate::time::{TimeResolver, format_table_time, is_time_token};
use crate::timeline::{TimelineHeader, TimelineTimes};
use chrono::NaiveDateTime;
use details::{EventDraft, TimedLine, parse_timed_line};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItlEvent {
    pub line: usize,
    pub raw_time: String,
    pub time: NaiveDateTime,
    pub experiment: String,
    pub mode: Option<String>,
    pub action: Option<String>,
    pub parameters: Vec<ActionParameter>,
    pub comment: Option<String>,
}

impl ItlEvent {
    fn resolve(draft: EventDraft, resolver: &TimeResolver, path: &Path) -> Result<Self> {
        let time = resolver
            .resolve(&draft.raw_time)
            .map_err(|e| EpsError::at(path, draft.line, e))?;

        Ok(Self {
            line: draft.line,
            raw_time: draft.raw_time,
            time,
            experiment: draft.experiment,
            mode: draft.mode,
            action: draft.action,
            parameters: draft.parameters,
            comment: draft.comment,
        })
    }

    /// Row in `itl_events` column order
    pub fn to_row(&self) -> Vec<Option<String>> {
        vec![
            Some(self.raw_time.clone()),
            Some(format_table_time(self.time)),
            Some(self.experiment.clone()),
            self.mode.clone(),
            self.action.clone(),
            render_parameters(&self.parameters),
            self.comment.clone(),
        ]
    }
}

/// A parsed ITL file
#[derive(Debug, Clone)]
pub struct ItlDocument {
    path: PathBuf,
    config: ParserConfig,
    pub metadata: Metadata,
    pub header: TimelineHeader,
    pub includes: Vec<IncludeFile>,
    pub unclassified: Vec<String>,
    pub events: Vec<ItlEvent>,
    times: TimelineTimes,
    table: RectangularTable,
}

impl ItlDocument {
    pub fn load(path: impl AsRef<Path>, config: &ParserConfig) -> Result<Self> {
        Self::load_with_reference(path, config, None)
    }

    /// Load with `reference` replacing the file's own `Ref_date`
    pub fn load_with_reference(
        path: impl AsRef<Path>,
        config: &ParserConfig,
        reference: Option<NaiveDateTime>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let content = read_source(path)?;
        Self::parse(path, &content, config, reference)
    }

    pub fn parse_str(content: &str, config: &ParserConfig) -> Result<Self> {
        Self::parse(Path::new(""), content, config, None)
    }

    fn parse(
        path: &Path,
        content: &str,
        config: &ParserConfig,
        reference: Option<NaiveDateTime>,
    ) -> Result<Self> {
        let lines = normalize(content);
        let header_section = parse_header(&lines);

        let mut header = TimelineHeader::default();
        let mut includes = Vec::new();
        let mut unclassified = header_section.unclassified;
        let mut drafts = Vec::new();

        for line in &lines[header_section.consumed..] {
            match line.kind {
                LineKind::Blank => {}
                LineKind::Comment => unclassified.push(line.text.clone()),
                LineKind::Data => {
                    let starts_timed = line
                        .text
                        .split_whitespace()
                        .next()
                        .is_some_and(is_time_token);

                    if starts_timed {
                        match parse_timed_line(line).map_err(|e| EpsError::at(path, line.number, e))? {
                            TimedLine::Event(draft) => drafts.push(draft),
                            TimedLine::Include(include) => includes.push(include),
                        }
                    } else if let Some((key, value)) = parse_field(line) {
                        header.accept(key, &value, line, &mut includes);
                    } else {
                        unclassified.push(line.text.clone());
                    }
                }
            }
        }

        let times = TimelineTimes::resolve(path, &header, config.time_format, reference)?;
        let mut events = drafts
            .into_iter()
            .map(|draft| ItlEvent::resolve(draft, &times.resolver, path))
            .collect::<Result<Vec<_>>>()?;
        // Stable, so events sharing a time keep file order
        events.sort_by_key(|e| e.time);

        let table = RectangularTable::from_rows(
            TableSchema::ItlEvents,
            events.iter().map(ItlEvent::to_row).collect(),
        )?;

        debug!(
            "Parsed ITL {}: {} events, {} includes",
            path.display(),
            events.len(),
            includes.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            config: config.clone(),
            metadata: header_section.metadata,
            header,
            includes,
            unclassified,
            events,
            times,
            table,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Events ordered by time, file order breaking ties
    pub fn events_table(&self) -> &RectangularTable {
        &self.table
    }

    pub fn tables(&self) -> Vec<&RectangularTable> {
        vec![&self.table]
    }

    pub fn table(&self, name: &str) -> Result<&RectangularTable> {
        if name == self.table.name() {
            Ok(&self.table)
        } else {
            Err(EpsError::UnknownTable {
                name: name.to_string(),
            })
        }
    }

    pub fn reference_date(&self) -> Option<NaiveDateTime> {
        self.times.reference
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.times.start
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.times.end
    }

    pub fn resolver(&self) -> &TimeResolver {
        &self.times.resolver
    }

    /// Resolve an include's time offset against this document
    pub fn include_offset(&self, include: &IncludeFile) -> Result<Option<NaiveDateTime>> {
        include
            .raw_time
            .as_deref()
            .map(|token| {
                self.times
                    .resolver
                    .resolve(token)
                    .map_err(|e| EpsError::at(&self.path, include.line, e))
            })
            .transpose()
    }

    /// Fold all included timelines into one time-ordered table
    pub fn merge_includes(&self) -> Result<MergedTimeline> {
        merge::merge(self)
    }

    pub fn to_itl_string(&self) -> String {
        writer::render(self)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_itl_string())?;
        Ok(())
    }
}
