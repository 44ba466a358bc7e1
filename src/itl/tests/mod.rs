//! Test utilities for ITL parsing
//!
//! Shared fixtures and helpers for the reader, merge and writer tests.

use std::fs;
use std::path::{Path, PathBuf};

mod merge_tests;

/// Root timeline with one header include and one timeline include
pub const ROOT_ITL: &str = r#"# Filename: ROOT.itl
# Comment: nominal science day
#
Ref_date: 01-Jan-2024
Start_time: 000_00:00:00
End_time: 005_00:00:00
Include_file: "A.itl" 001_00:00:00

000_01:00:00 MAG ON SET_RATE (RATE = 16 HZ)
002_06:00:00 MAG OFF
000_22:30:00 INCLUDE "B.itl"
"#;

/// Included timeline; its own Ref_date is overridden by the include offset
pub const A_ITL: &str = r#"Ref_date: 01-Jun-2030
000_00:30:00 CAM ON SHOOT
001_00:00:00 CAM OFF
"#;

pub const B_ITL: &str = r#"Ref_date: 01-Jan-2024
000_03:00:00 SOC PTR SLEW (TARGET = MOON)
"#;

/// Write `files` into `dir`, returning the path of each
pub fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, content)| {
            let path = dir.join(name);
            fs::write(&path, content).unwrap();
            path
        })
        .collect()
}
