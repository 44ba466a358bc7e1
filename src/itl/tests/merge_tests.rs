//! Tests for include merging

use super::{A_ITL, B_ITL, ROOT_ITL, write_files};
use crate::config::ParserConfig;
use crate::error::EpsError;
use crate::itl::ItlDocument;
use tempfile::TempDir;

#[test]
fn test_merge_orders_events_across_files() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_files(
        temp_dir.path(),
        &[("ROOT.itl", ROOT_ITL), ("A.itl", A_ITL), ("B.itl", B_ITL)],
    );

    let root = ItlDocument::load(&paths[0], &ParserConfig::default()).unwrap();
    let merged = root.merge_includes().unwrap();

    assert_eq!(merged.len(), 5);
    assert_eq!(merged.sources.len(), 3);
    assert!(merged.missing.is_empty());

    let times: Vec<_> = merged.events.iter().map(|e| e.event.time).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));

    let table = merged.table();
    let column: Vec<_> = table.column("time").unwrap();
    assert_eq!(
        column,
        vec![
            Some("2024-01-01T01:00:00"),
            Some("2024-01-02T00:30:00"),
            Some("2024-01-02T01:30:00"),
            Some("2024-01-03T00:00:00"),
            Some("2024-01-03T06:00:00"),
        ]
    );
    assert_eq!(table.get(2, "experiment"), Some("SOC"));
    assert_eq!(table.get(2, "raw_time"), Some("000_03:00:00"));
}

#[test]
fn test_merge_tracks_sources() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_files(
        temp_dir.path(),
        &[("ROOT.itl", ROOT_ITL), ("A.itl", A_ITL), ("B.itl", B_ITL)],
    );

    let root = ItlDocument::load(&paths[0], &ParserConfig::default()).unwrap();
    let merged = root.merge_includes().unwrap();

    assert_eq!(merged.sources[0], paths[0]);
    assert_eq!(merged.events_from(0).count(), 2);
    assert_eq!(merged.events_from(1).count(), 2);
    assert_eq!(merged.events_from(2).count(), 1);
    assert!(merged.events_from(1).all(|e| e.experiment == "CAM"));
}

#[test]
fn test_missing_include_is_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_files(
        temp_dir.path(),
        &[(
            "ROOT.itl",
            "Ref_date: 01-Jan-2024\nInclude_file: \"missing.itl\"\n000_01:00:00 MAG ON\n",
        )],
    );

    let root = ItlDocument::load(&paths[0], &ParserConfig::default()).unwrap();
    let merged = root.merge_includes().unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.missing.len(), 1);
    assert_eq!(merged.missing[0].file_name, "missing.itl");
    assert_eq!(merged.missing[0].line, 2);
}

#[test]
fn test_include_cycle_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_files(
        temp_dir.path(),
        &[
            (
                "ONE.itl",
                "Ref_date: 01-Jan-2024\n000_01:00:00 INCLUDE \"TWO.itl\"\n",
            ),
            (
                "TWO.itl",
                "Ref_date: 01-Jan-2024\n000_01:00:00 INCLUDE \"ONE.itl\"\n",
            ),
        ],
    );

    let root = ItlDocument::load(&paths[0], &ParserConfig::default()).unwrap();
    assert!(matches!(
        root.merge_includes(),
        Err(EpsError::IncludeCycle { .. })
    ));
}

#[test]
fn test_shared_include_is_not_a_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_files(
        temp_dir.path(),
        &[
            (
                "ROOT.itl",
                "Ref_date: 01-Jan-2024\n000_00:00:00 INCLUDE \"LEAF.itl\"\n001_00:00:00 INCLUDE \"LEAF.itl\"\n",
            ),
            ("LEAF.itl", "000_01:00:00 MAG ON\n"),
        ],
    );

    let root = ItlDocument::load(&paths[0], &ParserConfig::default()).unwrap();
    let merged = root.merge_includes().unwrap();

    assert_eq!(merged.len(), 2);
    assert_eq!(merged.table().get(0, "time"), Some("2024-01-01T01:00:00"));
    assert_eq!(merged.table().get(1, "time"), Some("2024-01-02T01:00:00"));
}

#[test]
fn test_include_depth_limit() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_files(
        temp_dir.path(),
        &[
            ("L0.itl", "Ref_date: 01-Jan-2024\nInclude_file: \"L1.itl\"\n"),
            ("L1.itl", "Ref_date: 01-Jan-2024\nInclude_file: \"L2.itl\"\n"),
            ("L2.itl", "Ref_date: 01-Jan-2024\n000_01:00:00 MAG ON\n"),
        ],
    );

    let shallow = ParserConfig::default().with_max_include_depth(1);
    let root = ItlDocument::load(&paths[0], &shallow).unwrap();
    match root.merge_includes() {
        Err(EpsError::IncludeDepthExceeded { depth, .. }) => assert_eq!(depth, 2),
        other => panic!("expected IncludeDepthExceeded, got {:?}", other),
    }

    let root = ItlDocument::load(&paths[0], &ParserConfig::default()).unwrap();
    assert_eq!(root.merge_includes().unwrap().len(), 1);
}

#[test]
fn test_strict_bounds_in_included_file() {
    let temp_dir = TempDir::new().unwrap();
    let paths = write_files(
        temp_dir.path(),
        &[
            (
                "ROOT.itl",
                "Ref_date: 01-Jan-2024\nInclude_file: \"SUB.itl\"\n",
            ),
            (
                "SUB.itl",
                "Ref_date: 01-Jan-2024\nEnd_time: 000_01:00:00\n000_02:00:00 MAG ON\n",
            ),
        ],
    );

    let lenient = ItlDocument::load(&paths[0], &ParserConfig::default()).unwrap();
    assert_eq!(lenient.merge_includes().unwrap().len(), 1);

    let strict = ParserConfig::default().with_strict_time_bounds();
    let root = ItlDocument::load(&paths[0], &strict).unwrap();
    assert!(matches!(
        root.merge_includes(),
        Err(EpsError::TimeOutOfRange { .. })
    ));
}
