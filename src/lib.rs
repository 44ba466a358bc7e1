//! EPS Parser Library
//!
//! Reads the text formats of the Experiment Planning Software into
//! metadata plus fixed-schema tables:
//! - EDF experiment descriptions (data buses, modules, modes, actions, ...)
//! - ITL timelines of instrument actions, with include merging
//! - EVF event files
//!
//! Every table follows a declared schema, uses `None` for missing cells
//! and converts to a polars `DataFrame`. Documents can be written back to
//! EPS text and checked against their declared time window and includes.

pub mod config;
pub mod consistency;
pub mod constants;
pub mod document;
pub mod edf;
pub mod error;
pub mod evf;
pub mod header;
pub mod itl;
pub mod models;
pub mod normalizer;
pub mod reader;
pub mod schema;
pub mod table;
pub mod time;
pub mod timeline;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{ParserConfig, TimeFormat};
pub use consistency::{ConsistencyReport, MissingInclude, check_document, check_includes_exist};
pub use document::ParsedDocument;
pub use edf::EdfDocument;
pub use error::{EpsError, Result};
pub use evf::EvfDocument;
pub use itl::{ItlDocument, MergedTimeline};
pub use models::{FileKind, IncludeFile, Metadata};
pub use schema::{BlockKind, TableSchema};
pub use table::RectangularTable;
