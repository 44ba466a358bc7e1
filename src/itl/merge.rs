//! Include merging.
//!
//! Includes are followed depth-first. An include's time offset becomes the
//! reference date of the included file. Missing files are warned about and
//! skipped; cycles and runaway nesting are errors.

use super::{ItlDocument, ItlEvent};
use crate::consistency::{MissingInclude, check_time_bounds, source_directory, time_bound_violations};
use crate::error::{EpsError, Result};
use crate::schema::TableSchema;
use crate::table::RectangularTable;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// One merged event and the file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEvent {
    /// Index into [`MergedTimeline::sources`]
    pub source: usize,
    pub event: ItlEvent,
}

/// Root events plus every reachable include, stable-sorted by time
#[derive(Debug, Clone)]
pub struct MergedTimeline {
    pub events: Vec<MergedEvent>,
    /// Files that contributed events, root first
    pub sources: Vec<PathBuf>,
    pub missing: Vec<MissingInclude>,
    table: RectangularTable,
}

impl MergedTimeline {
    pub fn table(&self) -> &RectangularTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events taken from one source file
    pub fn events_from(&self, source: usize) -> impl Iterator<Item = &ItlEvent> {
        self.events
            .iter()
            .filter(move |e| e.source == source)
            .map(|e| &e.event)
    }
}

pub(super) fn merge(root: &ItlDocument) -> Result<MergedTimeline> {
    let mut merger = Merger::default();
    merger.enter(root.path())?;
    merger.collect(root, 0)?;
    merger.leave(root.path());

    let Merger {
        mut events,
        sources,
        missing,
        ..
    } = merger;

    events.sort_by_key(|e| e.event.time);

    let table = RectangularTable::from_rows(
        TableSchema::ItlEvents,
        events.iter().map(|e| e.event.to_row()).collect(),
    )?;

    info!(
        "Merged {} events from {} files ({} missing includes)",
        events.len(),
        sources.len(),
        missing.len()
    );

    Ok(MergedTimeline {
        events,
        sources,
        missing,
        table,
    })
}

#[derive(Default)]
struct Merger {
    events: Vec<MergedEvent>,
    sources: Vec<PathBuf>,
    missing: Vec<MissingInclude>,
    /// Canonical paths on the current include chain
    active: HashSet<PathBuf>,
}

impl Merger {
    fn enter(&mut self, path: &std::path::Path) -> Result<()> {
        let canonical = canonical(path);
        if !self.active.insert(canonical) {
            return Err(EpsError::IncludeCycle {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn leave(&mut self, path: &std::path::Path) {
        self.active.remove(&canonical(path));
    }

    fn collect(&mut self, doc: &ItlDocument, depth: usize) -> Result<()> {
        let source = self.sources.len();
        self.sources.push(doc.path().to_path_buf());
        self.events.extend(doc.events.iter().cloned().map(|event| MergedEvent { source, event }));

        let directory = source_directory(doc.path());
        let config = doc.config();

        for include in &doc.includes {
            let path = directory.join(&include.file_name);

            if !path.is_file() {
                warn!(
                    "Include {} referenced from {} not found",
                    include.file_name,
                    doc.path().display()
                );
                self.missing.push(MissingInclude::new(doc.path(), include, path));
                continue;
            }

            if depth + 1 > config.max_include_depth {
                return Err(EpsError::IncludeDepthExceeded {
                    path,
                    depth: depth + 1,
                });
            }

            let reference = doc.include_offset(include)?;
            debug!(
                "Reading include {} (reference {:?})",
                path.display(),
                reference
            );

            self.enter(&path)?;
            let child = ItlDocument::load_with_reference(&path, config, reference)?;

            if config.strict_time_bounds {
                check_time_bounds(&child)?;
            } else {
                for violation in time_bound_violations(&child) {
                    warn!("{}: {}", path.display(), violation);
                }
            }

            self.collect(&child, depth + 1)?;
            self.leave(&path);
        }

        Ok(())
    }
}

fn canonical(path: &std::path::Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
