//! Test utilities for EVF parsing

mod reader_tests;
mod writer_tests;

pub const EVENTS_EVF: &str = r#"# EVF Filename: EVT_PASS.evf
# Generation Time: 01-Jan-2024_00:00:00
#
Ref_date: 01-Jan-2024
Start_time: 000_00:00:00
End_time: 002_00:00:00
Include_file: "ORBIT.evf"

# Time                 Event
000_10:00:00   AOS_START  (EXP = MAG ITEM = ANT1) (COUNT = 1) # first pass
000_10:45:00   AOS_END    (EXP = MAG ITEM = ANT1) (COUNT = 1)
01-Jan-2024_20:00:00   ECLIPSE_START
"#;
