//! EDF (Experiment Description File) documents.
//!
//! An EDF file describes one instrument: its data buses and stores,
//! modules and their states, modes, parameters, actions and constraints.
//! Each block kind materializes into its own table, present even when the
//! file has no block of that kind.
//!
//! ## Architecture
//!
//! - [`crate::reader`] - keyword-block scanning into ragged tables
//! - [`writer`] - EDF text output, children nested under their owners

pub mod writer;

#[cfg(test)]
mod tests;

use crate::config::ParserConfig;
use crate::document::read_source;
use crate::error::{EpsError, Result};
use crate::header::parse_header;
use crate::models::{IncludeFile, Metadata};
use crate::normalizer::normalize;
use crate::reader::BlockReader;
use crate::schema::{BlockKind, TableSchema};
use crate::table::RectangularTable;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A parsed EDF file
#[derive(Debug, Clone)]
pub struct EdfDocument {
    path: PathBuf,
    config: ParserConfig,
    pub metadata: Metadata,
    pub experiment: Option<String>,
    pub includes: Vec<IncludeFile>,
    pub global_properties: Metadata,
    pub variables: Metadata,
    pub unclassified: Vec<String>,
    /// One table per kind, in [`BlockKind::ALL`] order
    tables: Vec<RectangularTable>,
    owners: HashMap<BlockKind, Vec<Option<usize>>>,
}

impl EdfDocument {
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
        let header = parse_header(&lines);
        let readout = BlockReader::new(config).read(&lines[header.consumed..]);

        let tables = BlockKind::ALL
            .iter()
            .map(|kind| {
                let schema = TableSchema::Block(*kind);
                match readout.table(*kind) {
                    Some(ragged) => RectangularTable::materialize(schema, ragged),
                    None => Ok(RectangularTable::empty(schema)),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut unclassified = header.unclassified;
        unclassified.extend(readout.unclassified);

        debug!(
            "Parsed EDF {}: {} records in {} tables",
            path.display(),
            tables.iter().map(|t| t.height()).sum::<usize>(),
            tables.iter().filter(|t| !t.is_empty()).count()
        );

        Ok(Self {
            path: path.to_path_buf(),
            config: config.clone(),
            metadata: header.metadata,
            experiment: readout.experiment,
            includes: readout.includes,
            global_properties: readout.global_properties,
            variables: readout.variables,
            unclassified,
            tables,
            owners: readout.owners,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn table(&self, kind: BlockKind) -> &RectangularTable {
        // `BlockKind::ALL` follows declaration order
        &self.tables[kind as usize]
    }

    pub fn table_by_name(&self, name: &str) -> Result<&RectangularTable> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| EpsError::UnknownTable {
                name: name.to_string(),
            })
    }

    pub fn tables(&self) -> Vec<&RectangularTable> {
        self.tables.iter().collect()
    }

    /// Parent row of each child record; empty for kinds without a parent
    pub fn owners(&self, kind: BlockKind) -> &[Option<usize>] {
        self.owners.get(&kind).map(|o| o.as_slice()).unwrap_or(&[])
    }

    /// Child rows owned by `row` of the parent table
    pub fn children_of(&self, parent: BlockKind, row: usize) -> Vec<usize> {
        let Some(child) = parent.child() else {
            return Vec::new();
        };
        self.owners(child)
            .iter()
            .enumerate()
            .filter(|(_, owner)| **owner == Some(row))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn to_edf_string(&self) -> String {
        writer::render(self)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_edf_string())?;
        Ok(())
    }
}
