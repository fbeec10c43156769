//! The rule catalog. Each module covers one family of baseline requirements
//! and exposes a single `evaluate` returning the failures it found; rules
//! never abort on a violation and never mutate the model.

pub mod coil_efficiency;
pub mod economizers;
pub mod fan_power;
pub mod plant_controls;
pub mod plant_equipment;
pub mod supply_air_temp;
pub mod system_type;
pub mod topology;
pub mod vav_min_flow;
pub mod ventilation;
