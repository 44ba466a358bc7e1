//! Parser configuration.
//!
//! Provides the settings that callers pass explicitly into every load:
//! time-token disambiguation, strictness of consistency checks, include
//! merging limits and child-key prefixing for nested EDF blocks.

use crate::constants::DEFAULT_MAX_INCLUDE_DEPTH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How time tokens are routed to the elapsed or absolute parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    /// A `-` after the optional sign selects the absolute parser
    #[default]
    Auto,
    /// Every token is `[sign][ddd_]hh:mm:ss[.fff]` relative to the reference date
    Elapsed,
    /// Every token is `dd-Mon-yyyy[_hh:mm:ss]`
    Absolute,
}

impl FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(TimeFormat::Auto),
            "elapsed" | "relative" => Ok(TimeFormat::Elapsed),
            "absolute" => Ok(TimeFormat::Absolute),
            _ => Err(format!(
                "Invalid time format: {} (expected auto, elapsed or absolute)",
                s
            )),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeFormat::Auto => "auto",
            TimeFormat::Elapsed => "elapsed",
            TimeFormat::Absolute => "absolute",
        };
        write!(f, "{}", name)
    }
}

/// Settings shared by the EDF, ITL and EVF readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Dispatch rule between elapsed and absolute time tokens
    pub time_format: TimeFormat,

    /// Treat events outside the Start_time/End_time window as fatal
    pub strict_time_bounds: bool,

    /// Maximum include nesting followed by `merge_includes`
    pub max_include_depth: usize,

    /// Prefix child keys (`Module_state`, `Parameter_value`) with the parent key
    pub prefix_child_keys: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::Auto,
            strict_time_bounds: false,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            prefix_child_keys: true,
        }
    }
}

impl ParserConfig {
    /// Set the time-token dispatch rule
    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// Fail consistency checks on out-of-window events
    pub fn with_strict_time_bounds(mut self) -> Self {
        self.strict_time_bounds = true;
        self
    }

    /// Set the maximum include nesting depth
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Keep child keys exactly as written in the file
    pub fn without_child_key_prefix(mut self) -> Self {
        self.prefix_child_keys = false;
        self
    }
}
