//! Application constants for the EPS parser
//!
//! This module contains the lexical markers, reserved keywords, file
//! extensions and default values shared by the EDF, ITL and EVF readers.

// =============================================================================
// Lexical Markers
// =============================================================================

/// Comment-start token; everything after it on a physical line is a comment
pub const COMMENT_MARKER: char = '#';

/// Line continuation marker; joins a physical line with the next one
pub const CONTINUATION_MARKER: char = '\\';

/// Separator between key and value in `# key: value` header lines
pub const METADATA_SEPARATOR: &str = ": ";

/// Suffix that turns a token into a field declaration (`Mode:`)
pub const FIELD_SUFFIX: char = ':';

/// Separator inserted between a parent key and a child key (`MOD_A - STATE_1`)
pub const CHILD_KEY_SEPARATOR: &str = " - ";

// =============================================================================
// Reserved Words
// =============================================================================

/// Reserved action/experiment value marking an include directive in a timeline
pub const INCLUDE_KEYWORD: &str = "INCLUDE";

/// Experiment name of the Science Operations Centre pseudo-instrument
pub const SOC_EXPERIMENT: &str = "SOC";

/// Mode token used by SOC pointing requests
pub const PTR_MODE: &str = "PTR";

/// Data store label modifier that is part of the label itself
pub const SELECTIVE_MODIFIER: &str = "SELECTIVE";

/// Header variable names shared by ITL and EVF
pub mod header_fields {
    pub const REF_DATE: &str = "Ref_date";
    pub const START_TIME: &str = "Start_time";
    pub const END_TIME: &str = "End_time";
    pub const PROPAGATION_DELAY: &str = "Propagation_delay";
    pub const INIT_VALUE: &str = "Init_value";
    pub const INCLUDE_FILE: &str = "Include_file";
    pub const INCLUDE: &str = "Include";
    pub const EXPERIMENT: &str = "Experiment";
}

/// EDF global properties, recorded apart from the block tables
pub const EDF_GLOBAL_PROPERTIES: &[&str] = &[
    "Local_memory",
    "Dataflow",
    "Dataflow_PID",
    "Dataflow_aux_PID",
    "Data_volume_data_rate",
    "HK_data_volume",
    "TM_frame_overhead",
    "Power_profile_check",
    "Data_rate_profile_check",
    "Exclusive_subsystems",
    "Global_actions",
    "Global_constraints",
];

/// EVF parameter keys
pub mod evf_keys {
    pub const EXPERIMENT: &str = "EXP";
    pub const ITEM: &str = "ITEM";
    pub const COUNT: &str = "COUNT";
}

// =============================================================================
// Time Formats
// =============================================================================

/// Month abbreviations as they appear in absolute EPS dates
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Rendering of resolved timestamps in table cells
pub const TABLE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// =============================================================================
// File Kinds
// =============================================================================

pub const EDF_EXTENSION: &str = "edf";
pub const ITL_EXTENSION: &str = "itl";
pub const EVF_EXTENSION: &str = "evf";

// =============================================================================
// Defaults
// =============================================================================

/// Maximum nesting of ITL include files before merging gives up
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;
