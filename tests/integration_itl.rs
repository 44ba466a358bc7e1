//! Integration tests for ITL timelines
//!
//! These tests build small multi-file timelines on disk and verify
//! parsing, include merging, consistency checks and export.

use chrono::NaiveDate;
use eps_parser::consistency::{check_document, check_includes_exist};
use eps_parser::{EpsError, ItlDocument, ParsedDocument, ParserConfig};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCIENCE_ITL: &str = r#"# Filename: SCIENCE.itl
Ref_date: 15-Mar-2026
Start_time: 000_00:00:00
End_time: 003_00:00:00
Init_value: CAM OFF
Include_file: "CAM.itl" 001_00:00:00 # camera block

000_06:00:00 MAG ON START (RATE = 16 # Hz) # wake
002_00:00:00 SOC PTR POINT (TARGET = EARTH \
    MODE = TRACK)
"#;

const CAM_ITL: &str = r#"Ref_date: 01-Jan-2000
000_00:10:00 CAM ON EXPOSE (EXPO = 20 MS)
000_02:00:00 CAM OFF
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_parse_timeline_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(temp_dir.path(), "SCIENCE.itl", SCIENCE_ITL);

    let doc = ItlDocument::load(&path, &ParserConfig::default()).unwrap();

    assert_eq!(
        doc.reference_date(),
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap().and_hms_opt(0, 0, 0)
    );
    assert_eq!(doc.events.len(), 2);
    assert_eq!(doc.includes[0].comment.as_deref(), Some("camera block"));

    let first = &doc.events[0];
    assert_eq!(first.parameters[0].comment.as_deref(), Some("Hz"));
    assert_eq!(first.comment.as_deref(), Some("wake"));

    let second = &doc.events[1];
    assert_eq!(second.mode.as_deref(), Some("PTR"));
    assert_eq!(second.parameters.len(), 2);
    assert_eq!(second.parameters[1].assignment(), "MODE = TRACK");
}

#[test]
fn test_merge_and_export() {
    let temp_dir = TempDir::new().unwrap();
    let root = write(temp_dir.path(), "SCIENCE.itl", SCIENCE_ITL);
    write(temp_dir.path(), "CAM.itl", CAM_ITL);

    let doc = ItlDocument::load(&root, &ParserConfig::default()).unwrap();
    let merged = doc.merge_includes().unwrap();

    assert_eq!(merged.len(), doc.events.len() + 2);
    let experiments: Vec<_> = merged.table().column("experiment").unwrap();
    assert_eq!(experiments, vec![Some("MAG"), Some("CAM"), Some("CAM"), Some("SOC")]);
    assert_eq!(merged.table().get(1, "time"), Some("2026-03-16T00:10:00"));

    let df = merged.table().to_dataframe().unwrap();
    assert_eq!(df.height(), 4);
    assert_eq!(
        df.column("time").unwrap().dtype(),
        &DataType::Datetime(TimeUnit::Milliseconds, None)
    );

    let output = temp_dir.path().join("merged.parquet");
    let mut df = df;
    let file = fs::File::create(&output).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();
    let reread = ParquetReader::new(fs::File::open(&output).unwrap())
        .finish()
        .unwrap();
    assert_eq!(reread.height(), 4);
}

#[test]
fn test_missing_include_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        temp_dir.path(),
        "ROOT.itl",
        "Ref_date: 01-Jan-2024\nInclude_file: \"missing.itl\"\n000_01:00:00 MAG ON\n",
    );
    let config = ParserConfig::default();

    let doc = ItlDocument::load(&path, &config).unwrap();
    let missing = check_includes_exist(doc.path(), &doc.includes);

    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].file_name, "missing.itl");
    assert!(missing[0].to_string().contains("missing.itl"));
}

#[test]
fn test_out_of_window_events() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        temp_dir.path(),
        "LATE.itl",
        "Ref_date: 01-Jan-2024\nEnd_time: 000_12:00:00\n000_13:00:00 MAG OFF\n",
    );

    let lenient = ParserConfig::default();
    let doc = ParsedDocument::load(&path, &lenient).unwrap();
    let report = check_document(&doc, &lenient).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.warning_count(), 1);

    let strict = ParserConfig::default().with_strict_time_bounds();
    match check_document(&doc, &strict) {
        Err(EpsError::TimeOutOfRange { relation, bound, .. }) => {
            assert_eq!(relation, "after");
            assert_eq!(bound, "End_time");
        }
        other => panic!("expected TimeOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_round_trip_through_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(temp_dir.path(), "SCIENCE.itl", SCIENCE_ITL);
    let config = ParserConfig::default();

    let doc = ItlDocument::load(&path, &config).unwrap();
    let copy = temp_dir.path().join("copy.itl");
    doc.write(&copy).unwrap();
    let again = ItlDocument::load(&copy, &config).unwrap();

    assert_eq!(doc.events_table().rows(), again.events_table().rows());
    assert_eq!(doc.header.init_values, again.header.init_values);
}
