//! Format-independent view over parsed EPS files.
//!
//! [`ParsedDocument::load`] picks the reader from the file extension.

use crate::config::ParserConfig;
use crate::edf::EdfDocument;
use crate::error::{EpsError, Result};
use crate::evf::EvfDocument;
use crate::itl::ItlDocument;
use crate::models::{FileKind, IncludeFile, Metadata};
use crate::table::RectangularTable;
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::info;

/// Read a whole source file
pub(crate) fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(EpsError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| EpsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone)]
pub enum ParsedDocument {
    Edf(EdfDocument),
    Itl(ItlDocument),
    Evf(EvfDocument),
}

impl ParsedDocument {
    pub fn load(path: impl AsRef<Path>, config: &ParserConfig) -> Result<Self> {
        let path = path.as_ref();
        let kind = FileKind::detect(path)?;

        let doc = match kind {
            FileKind::Edf => ParsedDocument::Edf(EdfDocument::load(path, config)?),
            FileKind::Itl => ParsedDocument::Itl(ItlDocument::load(path, config)?),
            FileKind::Evf => ParsedDocument::Evf(EvfDocument::load(path, config)?),
        };

        info!(
            "Loaded {} file {} ({} rows)",
            kind,
            path.display(),
            doc.tables().iter().map(|t| t.height()).sum::<usize>()
        );
        Ok(doc)
    }

    pub fn kind(&self) -> FileKind {
        match self {
            ParsedDocument::Edf(_) => FileKind::Edf,
            ParsedDocument::Itl(_) => FileKind::Itl,
            ParsedDocument::Evf(_) => FileKind::Evf,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ParsedDocument::Edf(doc) => doc.path(),
            ParsedDocument::Itl(doc) => doc.path(),
            ParsedDocument::Evf(doc) => doc.path(),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            ParsedDocument::Edf(doc) => &doc.metadata,
            ParsedDocument::Itl(doc) => &doc.metadata,
            ParsedDocument::Evf(doc) => &doc.metadata,
        }
    }

    pub fn tables(&self) -> Vec<&RectangularTable> {
        match self {
            ParsedDocument::Edf(doc) => doc.tables(),
            ParsedDocument::Itl(doc) => doc.tables(),
            ParsedDocument::Evf(doc) => doc.tables(),
        }
    }

    pub fn table(&self, name: &str) -> Result<&RectangularTable> {
        match self {
            ParsedDocument::Edf(doc) => doc.table_by_name(name),
            ParsedDocument::Itl(doc) => doc.table(name),
            ParsedDocument::Evf(doc) => doc.table(name),
        }
    }

    pub fn includes(&self) -> &[IncludeFile] {
        match self {
            ParsedDocument::Edf(doc) => &doc.includes,
            ParsedDocument::Itl(doc) => &doc.includes,
            ParsedDocument::Evf(doc) => &doc.includes,
        }
    }

    pub fn unclassified(&self) -> &[String] {
        match self {
            ParsedDocument::Edf(doc) => &doc.unclassified,
            ParsedDocument::Itl(doc) => &doc.unclassified,
            ParsedDocument::Evf(doc) => &doc.unclassified,
        }
    }

    /// Free variables: loose EDF fields or unrecognized timeline header fields
    pub fn variables(&self) -> &Metadata {
        match self {
            ParsedDocument::Edf(doc) => &doc.variables,
            ParsedDocument::Itl(doc) => &doc.header.variables,
            ParsedDocument::Evf(doc) => &doc.header.variables,
        }
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        match self {
            ParsedDocument::Edf(_) => None,
            ParsedDocument::Itl(doc) => doc.start_time(),
            ParsedDocument::Evf(doc) => doc.start_time(),
        }
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        match self {
            ParsedDocument::Edf(_) => None,
            ParsedDocument::Itl(doc) => doc.end_time(),
            ParsedDocument::Evf(doc) => doc.end_time(),
        }
    }

    pub fn reference_date(&self) -> Option<NaiveDateTime> {
        match self {
            ParsedDocument::Edf(_) => None,
            ParsedDocument::Itl(doc) => doc.reference_date(),
            ParsedDocument::Evf(doc) => doc.reference_date(),
        }
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        match self {
            ParsedDocument::Edf(doc) => doc.write(path),
            ParsedDocument::Itl(doc) => doc.write(path),
            ParsedDocument::Evf(doc) => doc.write(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_dispatches_on_extension() {
        let temp_dir = TempDir::new().unwrap();
        let edf = temp_dir.path().join("inst.edf");
        let itl = temp_dir.path().join("plan.ITL");
        fs::write(&edf, "Mode: ON\n").unwrap();
        fs::write(&itl, "Ref_date: 01-Jan-2024\n000_01:00:00 MAG ON\n").unwrap();

        let config = ParserConfig::default();
        let edf = ParsedDocument::load(&edf, &config).unwrap();
        let itl = ParsedDocument::load(&itl, &config).unwrap();

        assert_eq!(edf.kind(), FileKind::Edf);
        assert_eq!(edf.table("modes").unwrap().height(), 1);
        assert_eq!(edf.start_time(), None);
        assert_eq!(itl.kind(), FileKind::Itl);
        assert_eq!(itl.tables().len(), 1);
        assert!(itl.reference_date().is_some());
    }

    #[test]
    fn test_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        let config = ParserConfig::default();

        let missing = temp_dir.path().join("absent.itl");
        assert!(matches!(
            ParsedDocument::load(&missing, &config),
            Err(EpsError::FileNotFound { .. })
        ));

        let other = temp_dir.path().join("notes.txt");
        fs::write(&other, "").unwrap();
        assert!(matches!(
            ParsedDocument::load(&other, &config),
            Err(EpsError::UnsupportedFormat { .. })
        ));

        let binary = temp_dir.path().join("bad.itl");
        fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        match ParsedDocument::load(&binary, &config) {
            Err(EpsError::Read { path, .. }) => assert_eq!(path, binary),
            other => panic!("expected read error, got {:?}", other.map(|d| d.kind())),
        }
    }
}
