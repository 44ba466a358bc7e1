//! Tests for EVF output

use super::EVENTS_EVF;
use crate::config::ParserConfig;
use crate::evf::EvfDocument;
use crate::evf::writer::render_event;
use tempfile::TempDir;

#[test]
fn test_round_trip_preserves_rows() {
    let doc = EvfDocument::parse_str(EVENTS_EVF, &ParserConfig::default()).unwrap();
    let again = EvfDocument::parse_str(&doc.to_evf_string(), &ParserConfig::default()).unwrap();

    assert_eq!(doc.events_table().rows(), again.events_table().rows());
    assert_eq!(doc.metadata, again.metadata);
    assert_eq!(doc.includes.len(), again.includes.len());
    assert_eq!(doc.start_time(), again.start_time());
}

#[test]
fn test_render_event() {
    let doc = EvfDocument::parse_str(EVENTS_EVF, &ParserConfig::default()).unwrap();
    assert_eq!(
        render_event(&doc.events[0]),
        "000_10:00:00   AOS_START  (EXP = MAG ITEM = ANT1) (COUNT = 1) # first pass"
    );
    assert_eq!(
        render_event(&doc.events[2]),
        "01-Jan-2024_20:00:00   ECLIPSE_START"
    );
}

#[test]
fn test_write_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("events.evf");
    let doc = EvfDocument::parse_str(EVENTS_EVF, &ParserConfig::default()).unwrap();

    doc.write(&path).unwrap();
    let reloaded = EvfDocument::load(&path, &ParserConfig::default()).unwrap();
    assert_eq!(reloaded.events_table().rows(), doc.events_table().rows());
}
