//! Tests for EVF document parsing

use super::EVENTS_EVF;
use crate::config::ParserConfig;
use crate::error::EpsError;
use crate::evf::EvfDocument;
use chrono::NaiveDate;

#[test]
fn test_events_document_structure() {
    let doc = EvfDocument::parse_str(EVENTS_EVF, &ParserConfig::default()).unwrap();

    assert_eq!(doc.metadata.get("EVF Filename"), Some("EVT_PASS.evf"));
    assert_eq!(doc.metadata.get("Generation Time"), Some("01-Jan-2024_00:00:00"));
    assert_eq!(doc.includes.len(), 1);
    assert_eq!(doc.includes[0].file_name, "ORBIT.evf");
    assert_eq!(doc.unclassified, vec!["#".to_string(), "# Time Event".to_string()]);
    assert_eq!(
        doc.end_time(),
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap().and_hms_opt(0, 0, 0)
    );
    assert_eq!(doc.events.len(), 3);
}

#[test]
fn test_events_table() {
    let doc = EvfDocument::parse_str(EVENTS_EVF, &ParserConfig::default()).unwrap();
    let table = doc.events_table();

    assert_eq!(table.name(), "evf_events");
    assert_eq!(table.height(), 3);
    assert_eq!(table.get(0, "time"), Some("2024-01-01T10:00:00"));
    assert_eq!(table.get(0, "event"), Some("AOS_START"));
    assert_eq!(table.get(0, "experiment"), Some("MAG"));
    assert_eq!(table.get(0, "item"), Some("ANT1"));
    assert_eq!(table.get(0, "count"), Some("1"));
    assert_eq!(table.get(0, "comment"), Some("first pass"));
    assert_eq!(table.get(1, "comment"), None);
    assert_eq!(table.get(2, "time"), Some("2024-01-01T20:00:00"));
    assert_eq!(table.get(2, "experiment"), None);
    assert_eq!(table.get(2, "count"), None);
}

#[test]
fn test_bad_count_reports_line() {
    let content = "Ref_date: 01-Jan-2024\n000_10:00:00 AOS (COUNT = many)\n";
    match EvfDocument::parse_str(content, &ParserConfig::default()) {
        Err(EpsError::Parse { line, source, .. }) => {
            assert_eq!(line, 2);
            assert!(matches!(*source, EpsError::MalformedValue { .. }));
        }
        other => panic!("expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_unknown_table() {
    let doc = EvfDocument::parse_str(EVENTS_EVF, &ParserConfig::default()).unwrap();
    assert!(doc.table("evf_events").is_ok());
    assert!(matches!(
        doc.table("itl_events"),
        Err(EpsError::UnknownTable { .. })
    ));
}

#[test]
fn test_events_sorted_by_time() {
    let content = "Ref_date: 01-Jan-2024\n\
                   002_00:00:00 LOS\n\
                   000_01:00:00 AOS (COUNT = 1)\n\
                   01-Jan-2024_01:00:00 ECLIPSE_START\n";
    let doc = EvfDocument::parse_str(content, &ParserConfig::default()).unwrap();
    let table = doc.events_table();

    assert_eq!(table.get(0, "event"), Some("AOS"));
    assert_eq!(table.get(1, "event"), Some("ECLIPSE_START"));
    assert_eq!(table.get(2, "event"), Some("LOS"));
    assert_eq!(table.get(2, "time"), Some("2024-01-03T00:00:00"));
}
