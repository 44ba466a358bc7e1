//! Test utilities for EDF parsing


/// Instrument description touching every block family
pub const SAMPLE_EDF: &str = r#"# Filename: MAG.edf
# (Version): 1.2
# free header note

Experiment: MAG "Magnetometer"
Include_file: "MAG_COMMON.edf"
Local_memory: 32 [Mbits]
Dataflow: MAG_FLOW
Mission_phase: CRUISE

Data_bus: BUS_A
Data_bus_rate_warning: 80
Data_bus_rate_limit: 100

Data_store: SSR SELECTIVE [1 Gbits] 100 [bits] 3 22

PID: 12 ENABLED 4
PID: 7 DISABLED  

FTS: 4 ON 100 [Mbits] # dump

Module: MAG_SENSOR
Module_level: 1
Nr_of_module_states: 2
Module_state: ON
MS_PID: 12
MS_power: 3.5 [Watts]
Module_state: OFF
MS_power: 0

Mode: SCIENCE
Mode_class: NOMINAL
Module_states: MAG_SENSOR ON
Nominal_power: 3.5

# note inside modes
Parameter: GAIN
Parameter_alias: MAG_GAIN
Raw_type: UINT
Parameter_value: LOW
Parameter_uas: 1
Parameter_value: HIGH
Parameter_uas: 2

Action: SET_GAIN
Action_level: NORMAL
Action_parameters: GAIN \
                   MODE
Duration: 00:00:10

Constraint: POWER_LIMIT
Constraint_type: RESOURCE
Severity: ERROR
Expression: Power < 10
"#;
