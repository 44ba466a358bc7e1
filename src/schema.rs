//! Table schemas and EDF block kinds.
//!
//! Every table produced by the parser has a fixed, declared column list.
//! Column order here is the column order of the materialized tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EDF keyword-block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    DataBus,
    DataStore,
    Pid,
    Fts,
    Fov,
    Area,
    Module,
    ModuleState,
    Mode,
    Parameter,
    ParameterValue,
    Action,
    Constraint,
}

impl BlockKind {
    /// All kinds in file writing order
    pub const ALL: [BlockKind; 13] = [
        BlockKind::DataBus,
        BlockKind::DataStore,
        BlockKind::Pid,
        BlockKind::Fts,
        BlockKind::Fov,
        BlockKind::Area,
        BlockKind::Module,
        BlockKind::ModuleState,
        BlockKind::Mode,
        BlockKind::Parameter,
        BlockKind::ParameterValue,
        BlockKind::Action,
        BlockKind::Constraint,
    ];

    /// Keyword (without the `:` suffix) that opens a record
    pub fn introducer(&self) -> &'static str {
        match self {
            BlockKind::DataBus => "Data_bus",
            BlockKind::DataStore => "Data_store",
            BlockKind::Pid => "PID",
            BlockKind::Fts => "FTS",
            BlockKind::Fov => "FOV",
            BlockKind::Area => "Area",
            BlockKind::Module => "Module",
            BlockKind::ModuleState => "Module_state",
            BlockKind::Mode => "Mode",
            BlockKind::Parameter => "Parameter",
            BlockKind::ParameterValue => "Parameter_value",
            BlockKind::Action => "Action",
            BlockKind::Constraint => "Constraint",
        }
    }

    /// Case-insensitive introducer lookup
    pub fn from_introducer(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.introducer().eq_ignore_ascii_case(keyword))
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            BlockKind::DataBus => "data_buses",
            BlockKind::DataStore => "data_stores",
            BlockKind::Pid => "pids",
            BlockKind::Fts => "fts",
            BlockKind::Fov => "fovs",
            BlockKind::Area => "areas",
            BlockKind::Module => "modules",
            BlockKind::ModuleState => "module_states",
            BlockKind::Mode => "modes",
            BlockKind::Parameter => "parameters",
            BlockKind::ParameterValue => "parameter_values",
            BlockKind::Action => "actions",
            BlockKind::Constraint => "constraints",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            BlockKind::DataBus => &["Data_bus", "Data_bus_rate_warning", "Data_bus_rate_limit"],
            BlockKind::DataStore => &[
                "Label",
                "Memory size",
                "Packet size",
                "Priority",
                "Identifier",
                "Comment",
            ],
            BlockKind::Pid => &["PID number", "Status", "Data Store ID", "Comment"],
            BlockKind::Fts => &["Data Store ID", "Status", "Data Volume", "Comment"],
            BlockKind::Fov => &[
                "FOV",
                "FOV_lookat",
                "FOV_upvector",
                "FOV_type",
                "FOV_algorithm",
                "FOV_geometric_angles",
                "FOV_geometric_pixels",
                "FOV_sub_view",
                "FOV_straylight_angles",
                "FOV_straylight_duration",
                "FOV_active",
                "FOV_image_timing",
                "FOV_imaging",
                "FOV_pitch",
                "FOV_yaw",
            ],
            BlockKind::Area => &[
                "Area",
                "Area_orientation",
                "Area_lighting_angle",
                "Area_lighting_duration",
            ],
            BlockKind::Module => &[
                "Module",
                "Module_level",
                "Module_dataflow",
                "Module_PID",
                "Module_aux_PID",
                "Sub_modules",
                "Nr_of_module_states",
            ],
            BlockKind::ModuleState => &[
                "Module_state",
                "MS_PID",
                "MS_aux_PID",
                "MS_power",
                "MS_power_parameter",
                "MS_data_rate",
                "MS_data_rate_parameter",
                "MS_aux_data_rate",
                "MS_constraints",
                "Repeat_action",
                "MS_pitch",
                "MS_yaw",
            ],
            BlockKind::Mode => &[
                "Mode",
                "Mode_class",
                "Module_states",
                "Internal_clock",
                "PID_enable_flags",
                "Nominal_power",
                "Power_parameter",
                "Nominal_data_rate",
                "Data_rate_parameter",
                "Mode_aux_data_rate",
                "Equivalent_power",
                "Equivalent_data_rate",
                "Mode_transitions",
                "Mode_actions",
                "Mode_constraints",
            ],
            BlockKind::Parameter => &[
                "Parameter",
                "Parameter_alias",
                "State_parameter",
                "Parameter_action",
                "Raw_type",
                "Eng_type",
                "Default_value",
                "Unit",
                "Raw_limits",
                "Eng_limits",
                "Resource",
                "Value_alias",
                "Nr_of_parameter_values",
            ],
            BlockKind::ParameterValue => &[
                "Parameter_value",
                "Parameter_uas",
                "Parameter_uwr",
                "Parameter_run",
            ],
            BlockKind::Action => &[
                "Action",
                "Action_alias",
                "Action_level",
                "Action_type",
                "Action_subsystem",
                "Action_parameters",
                "Internal_variables",
                "Computed_parameters",
                "Duration",
                "Minimum_duration",
                "Compression",
                "Separation",
                "Action_dataflow",
                "Action_PID",
                "Power_increase",
                "Data_rate_increase",
                "Data_volume",
                "Power_profile",
                "Data_rate_profile",
                "Write_to_Z_record",
                "Action_power_check",
                "Action_data_rate_check",
                "Obs_ID",
                "Update_at_start",
                "Update_when_ready",
                "Action_constraints",
                "Run_type",
                "Run_start_time",
                "Run_actions",
            ],
            BlockKind::Constraint => &[
                "Constraint",
                "Constraint_type",
                "Severity",
                "Constraint_group",
                "Condition",
                "Resource_constraint",
                "Resource_mass_memory",
                "Parameter_constraint",
                "Condition_experiment",
                "Expression",
            ],
        }
    }

    /// Child block switched to from inside this block
    pub fn child(&self) -> Option<BlockKind> {
        match self {
            BlockKind::Module => Some(BlockKind::ModuleState),
            BlockKind::Parameter => Some(BlockKind::ParameterValue),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<BlockKind> {
        match self {
            BlockKind::ModuleState => Some(BlockKind::Module),
            BlockKind::ParameterValue => Some(BlockKind::Parameter),
            _ => None,
        }
    }

    /// One introducer line per record, split into the declared columns
    pub fn is_positional(&self) -> bool {
        matches!(self, BlockKind::DataStore | BlockKind::Pid | BlockKind::Fts)
    }

    /// Secondary (non-introducer) field of this block, matched exactly
    pub fn has_field(&self, field: &str) -> bool {
        !self.is_positional() && self.columns()[1..].contains(&field)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.introducer())
    }
}

/// Schema tag carried by every rectangular table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableSchema {
    Block(BlockKind),
    ItlEvents,
    EvfEvents,
}

const ITL_EVENT_COLUMNS: &[&str] = &[
    "raw_time",
    "time",
    "experiment",
    "mode",
    "action",
    "parameters",
    "comment",
];

const EVF_EVENT_COLUMNS: &[&str] = &[
    "raw_time",
    "time",
    "event",
    "experiment",
    "item",
    "count",
    "comment",
];

impl TableSchema {
    pub fn name(&self) -> &'static str {
        match self {
            TableSchema::Block(kind) => kind.table_name(),
            TableSchema::ItlEvents => "itl_events",
            TableSchema::EvfEvents => "evf_events",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            TableSchema::Block(kind) => kind.columns(),
            TableSchema::ItlEvents => ITL_EVENT_COLUMNS,
            TableSchema::EvfEvents => EVF_EVENT_COLUMNS,
        }
    }

    /// Columns holding resolved timestamps
    pub fn time_columns(&self) -> &'static [&'static str] {
        match self {
            TableSchema::Block(_) => &[],
            TableSchema::ItlEvents | TableSchema::EvfEvents => &["time"],
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "itl_events" => Some(TableSchema::ItlEvents),
            "evf_events" => Some(TableSchema::EvfEvents),
            _ => BlockKind::ALL
                .into_iter()
                .find(|kind| kind.table_name() == name)
                .map(TableSchema::Block),
        }
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
