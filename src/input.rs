//! Deserialized form of the externally constructed building-model graph.
//!
//! One JSON document per model variant (baseline or proposed). The generator
//! that built the model owns its semantics; this crate only reads it, so every
//! field that can be absent in a generated model is an `Option` here and the
//! rules decide whether absence is itself a finding. All numeric fields are SI.

use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::{BufReader, Read};

pub fn ingest_model(json: impl Read) -> Result<BuildingModel, anyhow::Error> {
    serde_json::from_reader(BufReader::new(json)).context("Could not parse building model JSON")
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct BuildingModel {
    pub building: Building,
    pub thermal_zones: IndexMap<String, ThermalZone>,
    pub air_systems: IndexMap<String, AirSystem>,
    #[serde(default)]
    pub plant_loops: IndexMap<String, PlantLoop>,
    #[serde(default)]
    pub design_days: Vec<DesignDay>,
    /// Pre-extracted answers from the external simulation's summary reports,
    /// keyed by (report, table, row, column, units). Consumed as an opaque
    /// oracle; never recomputed here.
    pub tabular_results: Option<Vec<TabularResult>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Building {
    pub name: Option<String>,
    pub floor_area_m2: Option<f64>,
    pub stories: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ThermalZone {
    pub floor_area_m2: f64,
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
    #[serde(default)]
    pub spaces: Vec<Space>,
    pub thermostat: Option<Thermostat>,
    pub sizing: Option<ZoneSizing>,
    /// Minimum outdoor-air requirement resolved from the zone's design
    /// outdoor-air specifications, m³/s.
    pub minimum_outdoor_air_flow_m3_per_s: Option<f64>,
    #[serde(default)]
    pub equipment: Vec<ZoneEquipment>,
}

fn default_multiplier() -> u32 {
    1
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Space {
    pub name: String,
    pub standards_space_type: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Thermostat {
    pub heating_setpoint_schedule: Option<ScheduleSummary>,
    pub cooling_setpoint_schedule: Option<ScheduleSummary>,
}

/// Schedules arrive pre-summarised; full hourly expansion is the external
/// toolkit's job.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ScheduleSummary {
    pub min_value: f64,
    pub max_value: f64,
    pub design_day_value: Option<f64>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ZoneSizing {
    pub cooling_input_method: Option<SizingInputMethod>,
    pub cooling_design_supply_air_temperature_c: Option<f64>,
    pub cooling_design_temperature_difference_k: Option<f64>,
    pub heating_input_method: Option<SizingInputMethod>,
    pub heating_design_supply_air_temperature_c: Option<f64>,
    pub heating_design_temperature_difference_k: Option<f64>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum SizingInputMethod {
    SupplyAirTemperature,
    SupplyAirTemperatureDifference,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "Type", rename_all_fields = "PascalCase")]
pub enum ZoneEquipment {
    Ptac {
        name: String,
        fan: Option<Fan>,
        cooling_coil: Option<Coil>,
    },
    Pthp {
        name: String,
        fan: Option<Fan>,
        cooling_coil: Option<Coil>,
        heating_coil: Option<Coil>,
    },
    UnitHeater {
        name: String,
        fan: Option<Fan>,
    },
    FourPipeFanCoil {
        name: String,
        fan: Option<Fan>,
    },
    VavReheatTerminal {
        name: String,
        maximum_air_flow_m3_per_s: Option<f64>,
        autosized_maximum_air_flow_m3_per_s: Option<f64>,
        constant_minimum_air_flow_fraction: Option<f64>,
        fixed_minimum_air_flow_m3_per_s: Option<f64>,
    },
    ParallelPiuTerminal {
        name: String,
        maximum_primary_air_flow_m3_per_s: Option<f64>,
        autosized_maximum_primary_air_flow_m3_per_s: Option<f64>,
        minimum_primary_air_flow_fraction: Option<f64>,
        maximum_secondary_air_flow_m3_per_s: Option<f64>,
        autosized_maximum_secondary_air_flow_m3_per_s: Option<f64>,
        fan: Option<Fan>,
    },
    Diffuser {
        name: String,
    },
    ExhaustFan {
        name: String,
    },
}

impl ZoneEquipment {
    pub fn name(&self) -> &str {
        match self {
            ZoneEquipment::Ptac { name, .. }
            | ZoneEquipment::Pthp { name, .. }
            | ZoneEquipment::UnitHeater { name, .. }
            | ZoneEquipment::FourPipeFanCoil { name, .. }
            | ZoneEquipment::VavReheatTerminal { name, .. }
            | ZoneEquipment::ParallelPiuTerminal { name, .. }
            | ZoneEquipment::Diffuser { name, .. }
            | ZoneEquipment::ExhaustFan { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Fan {
    pub name: String,
    pub volume_control: FanVolumeControl,
    pub total_efficiency: Option<f64>,
    pub pressure_rise_pa: Option<f64>,
    pub motor_efficiency: Option<f64>,
    pub maximum_flow_m3_per_s: Option<f64>,
    pub autosized_maximum_flow_m3_per_s: Option<f64>,
    /// Part-load power coefficients, first to fifth.
    pub power_coefficients: Option<Vec<f64>>,
}

impl Fan {
    /// Hard-sized value wins over the sizing run's autosized one.
    pub fn design_flow_m3_per_s(&self) -> Option<f64> {
        self.maximum_flow_m3_per_s
            .or(self.autosized_maximum_flow_m3_per_s)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum FanVolumeControl {
    ConstantVolume,
    VariableVolume,
    OnOff,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "Type", rename_all_fields = "PascalCase")]
pub enum Coil {
    DxCoolingSingleSpeed {
        name: String,
        rated_cop: Option<f64>,
        rated_capacity_w: Option<f64>,
        autosized_capacity_w: Option<f64>,
    },
    DxCoolingTwoSpeed {
        name: String,
        rated_high_speed_cop: Option<f64>,
        rated_high_speed_capacity_w: Option<f64>,
        autosized_high_speed_capacity_w: Option<f64>,
    },
    DxHeatingSingleSpeed {
        name: String,
        rated_cop: Option<f64>,
        rated_capacity_w: Option<f64>,
        autosized_capacity_w: Option<f64>,
    },
    GasHeating {
        name: String,
        burner_efficiency: Option<f64>,
        nominal_capacity_w: Option<f64>,
        autosized_capacity_w: Option<f64>,
    },
    ElectricHeating {
        name: String,
        efficiency: Option<f64>,
    },
    WaterHeating {
        name: String,
        plant_loop: Option<String>,
    },
    WaterCooling {
        name: String,
        plant_loop: Option<String>,
    },
}

impl Coil {
    pub fn name(&self) -> &str {
        match self {
            Coil::DxCoolingSingleSpeed { name, .. }
            | Coil::DxCoolingTwoSpeed { name, .. }
            | Coil::DxHeatingSingleSpeed { name, .. }
            | Coil::GasHeating { name, .. }
            | Coil::ElectricHeating { name, .. }
            | Coil::WaterHeating { name, .. }
            | Coil::WaterCooling { name, .. } => name,
        }
    }

    /// Rated capacity in W, hard-sized over autosized, for variants that carry one.
    pub fn capacity_w(&self) -> Option<f64> {
        match self {
            Coil::DxCoolingSingleSpeed {
                rated_capacity_w,
                autosized_capacity_w,
                ..
            }
            | Coil::DxHeatingSingleSpeed {
                rated_capacity_w,
                autosized_capacity_w,
                ..
            } => rated_capacity_w.or(*autosized_capacity_w),
            Coil::DxCoolingTwoSpeed {
                rated_high_speed_capacity_w,
                autosized_high_speed_capacity_w,
                ..
            } => rated_high_speed_capacity_w.or(*autosized_high_speed_capacity_w),
            Coil::GasHeating {
                nominal_capacity_w,
                autosized_capacity_w,
                ..
            } => nominal_capacity_w.or(*autosized_capacity_w),
            Coil::ElectricHeating { .. } | Coil::WaterHeating { .. } | Coil::WaterCooling { .. } => {
                None
            }
        }
    }

    /// Rated COP for the DX variants, at high speed for two-speed coils.
    pub fn rated_cop(&self) -> Option<f64> {
        match self {
            Coil::DxCoolingSingleSpeed { rated_cop, .. }
            | Coil::DxHeatingSingleSpeed { rated_cop, .. } => *rated_cop,
            Coil::DxCoolingTwoSpeed {
                rated_high_speed_cop,
                ..
            } => *rated_high_speed_cop,
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AirSystem {
    /// Machine-readable baseline system type tag, where the generator attached
    /// one via additional properties. The "(SysN)" name suffix is the older
    /// convention; both are understood behind the facade.
    pub baseline_system_type: Option<String>,
    pub design_supply_air_flow_m3_per_s: Option<f64>,
    pub outdoor_air_system: Option<OutdoorAirSystem>,
    pub supply_fan: Option<Fan>,
    #[serde(default)]
    pub coils: Vec<Coil>,
    /// Setpoint managers on the supply outlet node.
    #[serde(default)]
    pub setpoint_managers: Vec<SetpointManager>,
    /// Names of the thermal zones this system serves.
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub gas_phase_air_cleaning: bool,
    #[serde(default)]
    pub open_refrigerated_casework: bool,
    #[serde(default)]
    pub serves_computer_rooms: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct OutdoorAirSystem {
    pub economizer_control_type: Option<String>,
    pub economizer_maximum_limit_dry_bulb_temperature_c: Option<f64>,
    pub minimum_outdoor_air_flow_m3_per_s: Option<f64>,
    pub demand_controlled_ventilation: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "Type", rename_all_fields = "PascalCase")]
pub enum SetpointManager {
    OutdoorAirReset {
        name: String,
        setpoint_at_outdoor_low_temperature_c: f64,
        outdoor_low_temperature_c: f64,
        setpoint_at_outdoor_high_temperature_c: f64,
        outdoor_high_temperature_c: f64,
    },
    Warmest {
        name: String,
        minimum_setpoint_temperature_c: f64,
        maximum_setpoint_temperature_c: f64,
    },
    FollowOutdoorAirTemperature {
        name: String,
        control_variable: Option<String>,
        reference_temperature_type: Option<String>,
        offset_temperature_difference_k: Option<f64>,
        maximum_setpoint_temperature_c: Option<f64>,
        minimum_setpoint_temperature_c: Option<f64>,
    },
    Scheduled {
        name: String,
        schedule: Option<ScheduleSummary>,
    },
    SingleZoneReheat {
        name: String,
        minimum_supply_air_temperature_c: Option<f64>,
        maximum_supply_air_temperature_c: Option<f64>,
    },
}

impl SetpointManager {
    pub fn name(&self) -> &str {
        match self {
            SetpointManager::OutdoorAirReset { name, .. }
            | SetpointManager::Warmest { name, .. }
            | SetpointManager::FollowOutdoorAirTemperature { name, .. }
            | SetpointManager::Scheduled { name, .. }
            | SetpointManager::SingleZoneReheat { name, .. } => name,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SetpointManager::OutdoorAirReset { .. } => "OutdoorAirReset",
            SetpointManager::Warmest { .. } => "Warmest",
            SetpointManager::FollowOutdoorAirTemperature { .. } => "FollowOutdoorAirTemperature",
            SetpointManager::Scheduled { .. } => "Scheduled",
            SetpointManager::SingleZoneReheat { .. } => "SingleZoneReheat",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PlantLoop {
    pub loop_type: PlantLoopType,
    /// Explicit service-water-heating flag; loops named "DHW"/"Service Water
    /// Heating" are also treated as SWH for compatibility with older models.
    #[serde(default)]
    pub service_water_heating: bool,
    pub sizing: Option<PlantSizing>,
    #[serde(default)]
    pub supply_components: Vec<PlantComponent>,
    #[serde(default)]
    pub demand_components: Vec<PlantComponent>,
    /// Setpoint managers on the supply outlet node.
    #[serde(default)]
    pub setpoint_managers: Vec<SetpointManager>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum PlantLoopType {
    Heating,
    Cooling,
    Condenser,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PlantSizing {
    pub design_loop_exit_temperature_c: Option<f64>,
    pub loop_design_temperature_difference_k: Option<f64>,
    pub sizing_factor: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "Type", rename_all_fields = "PascalCase")]
pub enum PlantComponent {
    Boiler {
        name: String,
        nominal_capacity_w: Option<f64>,
        #[serde(default)]
        capacity_autosized: bool,
        thermal_efficiency: Option<f64>,
    },
    Chiller {
        name: String,
        reference_cop: Option<f64>,
        reference_capacity_w: Option<f64>,
        condenser_loop: Option<String>,
        capacity_curve: Option<String>,
        energy_input_ratio_curve: Option<String>,
        part_load_curve: Option<String>,
    },
    CoolingTower {
        name: String,
        design_inlet_air_wet_bulb_temperature_c: Option<f64>,
        design_approach_temperature_k: Option<f64>,
        design_range_temperature_k: Option<f64>,
    },
    DistrictHeating {
        name: String,
    },
    DistrictCooling {
        name: String,
    },
    HeatExchanger {
        name: String,
    },
    Pump {
        name: String,
        speed_control: PumpSpeedControl,
        motor_efficiency: Option<f64>,
        rated_head_pa: Option<f64>,
        /// Part-load performance curve coefficients, first to fourth.
        part_load_coefficients: Option<Vec<f64>>,
        /// Headered pump banks count as this many pumps.
        pumps_in_bank: Option<u32>,
    },
    /// A hot/chilled-water coil hanging off the loop's demand side. Its host
    /// is resolved through whichever of the three links the generator filled
    /// in: an air system, a piece of zone equipment, or a VAV reheat terminal
    /// reaching its zone through the outlet-node/port-list indirection.
    WaterCoil {
        name: String,
        function: WaterCoilFunction,
        air_system: Option<String>,
        zone: Option<String>,
        terminal: Option<TerminalHookup>,
    },
    WaterUseConnections {
        name: String,
    },
    Pipe {
        name: String,
    },
}

impl PlantComponent {
    pub fn name(&self) -> &str {
        match self {
            PlantComponent::Boiler { name, .. }
            | PlantComponent::Chiller { name, .. }
            | PlantComponent::CoolingTower { name, .. }
            | PlantComponent::DistrictHeating { name, .. }
            | PlantComponent::DistrictCooling { name, .. }
            | PlantComponent::HeatExchanger { name, .. }
            | PlantComponent::Pump { name, .. }
            | PlantComponent::WaterCoil { name, .. }
            | PlantComponent::WaterUseConnections { name, .. }
            | PlantComponent::Pipe { name, .. } => name,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum PumpSpeedControl {
    ConstantSpeed,
    VariableSpeed,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum WaterCoilFunction {
    Heating,
    Cooling,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TerminalHookup {
    pub outlet_node: Option<OutletNode>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct OutletNode {
    pub port_list: Option<PortList>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PortList {
    pub thermal_zone: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DesignDay {
    pub name: String,
    pub day_type: String,
    pub humidity_indicating_type: Option<String>,
    pub wet_bulb_at_maximum_dry_bulb_c: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TabularResult {
    pub report: String,
    pub table: String,
    pub row: String,
    pub column: String,
    pub units: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;
    use std::fs::File;
    use walkdir::WalkDir;

    #[rstest]
    fn should_successfully_parse_all_demo_models() {
        for entry in WalkDir::new("./demos/models")
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.file_name().to_str().unwrap().ends_with("json")
            })
        {
            let parsed = ingest_model(File::open(entry.path()).unwrap());
            assert!(
                parsed.is_ok(),
                "error was {:?} when parsing file {}",
                parsed.err().unwrap(),
                entry.file_name().to_str().unwrap()
            );
        }
    }

    #[rstest]
    fn should_parse_minimal_model_with_optional_fields_absent() {
        let doc = json!({
            "Building": {"Name": "Small Office", "FloorAreaM2": 511.0, "Stories": 1},
            "ThermalZones": {
                "Core_ZN": {
                    "FloorAreaM2": 149.66,
                    "Equipment": [
                        {"Type": "VavReheatTerminal", "Name": "Core_ZN VAV Term",
                         "AutosizedMaximumAirFlowM3PerS": 0.4719,
                         "ConstantMinimumAirFlowFraction": 0.4}
                    ]
                }
            },
            "AirSystems": {
                "PVAV_Reheat (Sys5)": {
                    "Zones": ["Core_ZN"],
                    "SetpointManagers": [
                        {"Type": "Warmest", "Name": "Sys5 SAT Reset",
                         "MinimumSetpointTemperatureC": 12.7778,
                         "MaximumSetpointTemperatureC": 15.5556}
                    ]
                }
            }
        });
        let model: BuildingModel = serde_json::from_value(doc).unwrap();
        let zone = &model.thermal_zones["Core_ZN"];
        assert_eq!(zone.multiplier, 1);
        assert!(zone.thermostat.is_none());
        let system = &model.air_systems["PVAV_Reheat (Sys5)"];
        assert!(system.baseline_system_type.is_none());
        assert_eq!(system.setpoint_managers.len(), 1);
    }

    #[rstest]
    fn should_reject_unknown_fields() {
        let doc = json!({
            "Building": {"Name": "x", "FloorAreaM2": 1.0, "Stories": 1, "Orientation": 90.0},
            "ThermalZones": {},
            "AirSystems": {}
        });
        assert!(serde_json::from_value::<BuildingModel>(doc).is_err());
    }

    #[rstest]
    fn should_prefer_hard_sized_capacity_over_autosized() {
        let coil: Coil = serde_json::from_value(json!({
            "Type": "DxCoolingSingleSpeed",
            "Name": "PSZ-AC 1 Clg Coil",
            "RatedCop": 3.1,
            "RatedCapacityW": 20000.0,
            "AutosizedCapacityW": 18000.0
        }))
        .unwrap();
        assert_eq!(coil.capacity_w(), Some(20000.0));
        assert_eq!(coil.name(), "PSZ-AC 1 Clg Coil");
    }
}
