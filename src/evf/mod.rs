//! EVF (Event File) documents.
//!
//! Same header variables as ITL timelines, then one timed event per line.

pub mod details;
pub mod writer;

#[cfg(test)]
mod tests;

use crate::config::ParserConfig;
use crate::document::read_source;
use crate::error::{EpsError, Result};
use crate::header::parse_header;
use crate::models::{IncludeFile, Metadata};
use crate::normalizer::{LineKind, normalize};
use crate::reader::parse_field;
use crate::schema::TableSchema;
use crate::table::RectangularTable;
use crate::time::{TimeResolver, format_table_time, is_time_token};
use crate::timeline::{TimelineHeader, TimelineTimes};
use chrono::NaiveDateTime;
use details::{EvfDraft, parse_event_line};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvfEvent {
    pub line: usize,
    pub raw_time: String,
    pub time: NaiveDateTime,
    pub event: String,
    pub experiment: Option<String>,
    pub item: Option<String>,
    pub count: Option<u64>,
    pub comment: Option<String>,
}

impl EvfEvent {
    fn resolve(draft: EvfDraft, resolver: &TimeResolver, path: &Path) -> Result<Self> {
        let time = resolver
            .resolve(&draft.raw_time)
            .map_err(|e| EpsError::at(path, draft.line, e))?;

        Ok(Self {
            line: draft.line,
            raw_time: draft.raw_time,
            time,
            event: draft.event,
            experiment: draft.experiment,
            item: draft.item,
            count: draft.count,
            comment: draft.comment,
        })
    }

    /// Row in `evf_events` column order
    pub fn to_row(&self) -> Vec<Option<String>> {
        vec![
            Some(self.raw_time.clone()),
            Some(format_table_time(self.time)),
            Some(self.event.clone()),
            self.experiment.clone(),
            self.item.clone(),
            self.count.map(|c| c.to_string()),
            self.comment.clone(),
        ]
    }
}

/// A parsed EVF file
#[derive(Debug, Clone)]
pub struct EvfDocument {
    path: PathBuf,
    pub metadata: Metadata,
    pub header: TimelineHeader,
    pub includes: Vec<IncludeFile>,
    pub unclassified: Vec<String>,
    pub events: Vec<EvfEvent>,
    times: TimelineTimes,
    table: RectangularTable,
}

impl EvfDocument {
    pub fn load(path: impl AsRef<Path>, config: &ParserConfig) -> Result<Self> {
        let path = path.as_ref();
        let content = read_source(path)?;
        Self::parse(path, &content, config)
    }

    pub fn parse_str(content: &str, config: &ParserConfig) -> Result<Self> {
        Self::parse(Path::new(""), content, config)
    }

    fn parse(path: &Path, content: &str, config: &ParserConfig) -> Result<Self> {
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
                        drafts.push(
                            parse_event_line(line).map_err(|e| EpsError::at(path, line.number, e))?,
                        );
                    } else if let Some((key, value)) = parse_field(line) {
                        header.accept(key, &value, line, &mut includes);
                    } else {
                        unclassified.push(line.text.clone());
                    }
                }
            }
        }

        let times = TimelineTimes::resolve(path, &header, config.time_format, None)?;
        let mut events = drafts
            .into_iter()
            .map(|draft| EvfEvent::resolve(draft, &times.resolver, path))
            .collect::<Result<Vec<_>>>()?;
        // Stable, so events sharing a time keep file order
        events.sort_by_key(|e| e.time);

        let table = RectangularTable::from_rows(
            TableSchema::EvfEvents,
            events.iter().map(EvfEvent::to_row).collect(),
        )?;

        debug!("Parsed EVF {}: {} events", path.display(), events.len());

        Ok(Self {
            path: path.to_path_buf(),
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

    pub fn to_evf_string(&self) -> String {
        writer::render(self)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_evf_string())?;
        Ok(())
    }
}
