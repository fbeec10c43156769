//! Plant loop sizing and control rules (G3.1.3.2-.4, .8-.9, .11): design
//! temperatures and deltas, outdoor-air reset schedules on hot/chilled water
//! loops, and the wet-bulb-following condenser loop with its tower design
//! conditions.

use crate::core::access::ModelFacade;
use crate::core::compare::{check_token, check_value, Tolerance};
use crate::core::formulas::condenser::{
    clamp_design_wet_bulb, design_approach_r, maximum_setpoint_f, tower_design_wet_bulb_f,
    DEFAULT_DESIGN_WET_BULB_F, MINIMUM_SETPOINT_F, TOWER_DESIGN_RANGE_R,
};
use crate::core::formulas::plant_counts::{COOLING_SIZING_FACTOR, HEATING_SIZING_FACTOR};
use crate::core::units::{celsius_to_fahrenheit, delta_kelvin_to_rankine, fahrenheit_to_celsius};
use crate::input::{PlantComponent, PlantLoop, PlantLoopType, SetpointManager};
use crate::report::{Failure, RuleId};
use crate::scenario::ScenarioContext;

const RULE: RuleId = RuleId::PlantControls;

const SIZING_TOLERANCE: f64 = 0.1;
const SIZING_FACTOR_TOLERANCE: f64 = 0.01;
const HOT_WATER_RESET_TOLERANCE_C: f64 = 0.1;
const CHILLED_WATER_RESET_TOLERANCE_C: f64 = 0.05;
const CONDENSER_TOLERANCE: f64 = 0.05;

/// Loop design temperatures and the reset schedule endpoints, all in °F
/// (reset outdoor temperatures are the OA dry-bulbs the schedule pivots on).
struct LoopExpectations {
    exit_temperature_f: f64,
    delta_t_r: f64,
    sizing_factor: f64,
    setpoint_at_outdoor_low_f: f64,
    outdoor_low_f: f64,
    setpoint_at_outdoor_high_f: f64,
    outdoor_high_f: f64,
    reset_tolerance_c: f64,
}

const HOT_WATER: LoopExpectations = LoopExpectations {
    exit_temperature_f: 180.,
    delta_t_r: 50.,
    sizing_factor: HEATING_SIZING_FACTOR,
    setpoint_at_outdoor_low_f: 180.,
    outdoor_low_f: 20.,
    setpoint_at_outdoor_high_f: 150.,
    outdoor_high_f: 50.,
    reset_tolerance_c: HOT_WATER_RESET_TOLERANCE_C,
};

const CHILLED_WATER: LoopExpectations = LoopExpectations {
    exit_temperature_f: 44.,
    delta_t_r: 12.,
    sizing_factor: COOLING_SIZING_FACTOR,
    setpoint_at_outdoor_low_f: 54.,
    outdoor_low_f: 60.,
    setpoint_at_outdoor_high_f: 44.,
    outdoor_high_f: 80.,
    reset_tolerance_c: CHILLED_WATER_RESET_TOLERANCE_C,
};

pub fn evaluate(facade: &ModelFacade, _context: &ScenarioContext) -> Vec<Failure> {
    let mut failures = Vec::new();
    for (name, plant_loop) in facade.hvac_loops_of_type(PlantLoopType::Heating) {
        check_loop(name, plant_loop, &HOT_WATER, has_heat_source(plant_loop), &mut failures);
    }
    for (name, plant_loop) in facade.hvac_loops_of_type(PlantLoopType::Cooling) {
        check_loop(name, plant_loop, &CHILLED_WATER, has_cold_source(plant_loop), &mut failures);
    }
    for (name, plant_loop) in facade.hvac_loops_of_type(PlantLoopType::Condenser) {
        check_condenser_loop(facade, name, plant_loop, &mut failures);
    }
    failures
}

/// Reset schedules belong on loops with their own heating/cooling source;
/// secondary loops fed through a heat exchanger follow the primary's
/// setpoint instead.
fn has_heat_source(plant_loop: &PlantLoop) -> bool {
    plant_loop.supply_components.iter().any(|c| {
        matches!(
            c,
            PlantComponent::Boiler { .. } | PlantComponent::DistrictHeating { .. }
        )
    })
}

fn has_cold_source(plant_loop: &PlantLoop) -> bool {
    plant_loop.supply_components.iter().any(|c| {
        matches!(
            c,
            PlantComponent::Chiller { .. } | PlantComponent::DistrictCooling { .. }
        )
    })
}

fn check_loop(
    name: &str,
    plant_loop: &PlantLoop,
    expectations: &LoopExpectations,
    reset_required: bool,
    failures: &mut Vec<Failure>,
) {
    match plant_loop.sizing {
        None => failures.push(Failure::missing_object(RULE, name, "plant sizing data")),
        Some(sizing) => {
            match sizing.design_loop_exit_temperature_c {
                None => failures.push(Failure::missing_object(
                    RULE,
                    name,
                    "a design loop exit temperature",
                )),
                Some(exit_c) => failures.extend(check_value(
                    RULE,
                    name,
                    "design loop exit temperature",
                    expectations.exit_temperature_f,
                    celsius_to_fahrenheit(exit_c),
                    Some("F"),
                    Tolerance::Absolute(SIZING_TOLERANCE),
                )),
            }
            match sizing.loop_design_temperature_difference_k {
                None => failures.push(Failure::missing_object(
                    RULE,
                    name,
                    "a loop design temperature difference",
                )),
                Some(delta_k) => failures.extend(check_value(
                    RULE,
                    name,
                    "loop design temperature difference",
                    expectations.delta_t_r,
                    delta_kelvin_to_rankine(delta_k),
                    Some("R"),
                    Tolerance::Absolute(SIZING_TOLERANCE),
                )),
            }
            if let Some(sizing_factor) = sizing.sizing_factor {
                failures.extend(check_value(
                    RULE,
                    name,
                    "sizing factor",
                    expectations.sizing_factor,
                    sizing_factor,
                    None,
                    Tolerance::Absolute(SIZING_FACTOR_TOLERANCE),
                ));
            }
        }
    }
    if reset_required {
        check_reset_manager(name, plant_loop, expectations, failures);
    }
}

fn check_reset_manager(
    name: &str,
    plant_loop: &PlantLoop,
    expectations: &LoopExpectations,
    failures: &mut Vec<Failure>,
) {
    let reset = plant_loop.setpoint_managers.iter().find_map(|manager| {
        if let SetpointManager::OutdoorAirReset {
            setpoint_at_outdoor_low_temperature_c,
            outdoor_low_temperature_c,
            setpoint_at_outdoor_high_temperature_c,
            outdoor_high_temperature_c,
            ..
        } = manager
        {
            Some([
                (
                    "setpoint at outdoor low",
                    *setpoint_at_outdoor_low_temperature_c,
                    expectations.setpoint_at_outdoor_low_f,
                ),
                (
                    "outdoor low temperature",
                    *outdoor_low_temperature_c,
                    expectations.outdoor_low_f,
                ),
                (
                    "setpoint at outdoor high",
                    *setpoint_at_outdoor_high_temperature_c,
                    expectations.setpoint_at_outdoor_high_f,
                ),
                (
                    "outdoor high temperature",
                    *outdoor_high_temperature_c,
                    expectations.outdoor_high_f,
                ),
            ])
        } else {
            None
        }
    });
    let Some(endpoints) = reset else {
        failures.push(Failure::missing_object(
            RULE,
            name,
            "an outdoor-air reset setpoint manager",
        ));
        return;
    };
    for (quantity, actual_c, expected_f) in endpoints {
        failures.extend(check_value(
            RULE,
            name,
            quantity,
            fahrenheit_to_celsius(expected_f),
            actual_c,
            Some("C"),
            Tolerance::Absolute(expectations.reset_tolerance_c),
        ));
    }
}

fn check_condenser_loop(
    facade: &ModelFacade,
    name: &str,
    plant_loop: &PlantLoop,
    failures: &mut Vec<Failure>,
) {
    let wet_bulb_f = clamp_design_wet_bulb(
        facade
            .evaporation_design_wet_bulb_f()
            .unwrap_or(DEFAULT_DESIGN_WET_BULB_F),
    );
    let approach_r = design_approach_r(wet_bulb_f);

    let follow = plant_loop.setpoint_managers.iter().find_map(|manager| {
        if let SetpointManager::FollowOutdoorAirTemperature {
            control_variable,
            reference_temperature_type,
            offset_temperature_difference_k,
            maximum_setpoint_temperature_c,
            minimum_setpoint_temperature_c,
            ..
        } = manager
        {
            Some((
                control_variable.as_deref(),
                reference_temperature_type.as_deref(),
                *offset_temperature_difference_k,
                *maximum_setpoint_temperature_c,
                *minimum_setpoint_temperature_c,
            ))
        } else {
            None
        }
    });
    match follow {
        None => failures.push(Failure::missing_object(
            RULE,
            name,
            "a follow-outdoor-air-temperature setpoint manager",
        )),
        Some((control_variable, reference_type, offset_k, maximum_c, minimum_c)) => {
            failures.extend(check_token(
                RULE,
                name,
                "control variable",
                "Temperature",
                control_variable.unwrap_or(""),
            ));
            failures.extend(check_token(
                RULE,
                name,
                "reference temperature type",
                "OutdoorAirWetBulb",
                reference_type.unwrap_or(""),
            ));
            if let Some(offset_k) = offset_k {
                failures.extend(check_value(
                    RULE,
                    name,
                    "wet-bulb approach offset",
                    approach_r,
                    delta_kelvin_to_rankine(offset_k),
                    Some("R"),
                    Tolerance::Absolute(CONDENSER_TOLERANCE),
                ));
            }
            match maximum_c {
                None => failures.push(Failure::missing_object(
                    RULE,
                    name,
                    "a maximum setpoint temperature",
                )),
                Some(maximum_c) => failures.extend(check_value(
                    RULE,
                    name,
                    "maximum setpoint temperature",
                    maximum_setpoint_f(wet_bulb_f),
                    celsius_to_fahrenheit(maximum_c),
                    Some("F"),
                    Tolerance::Absolute(CONDENSER_TOLERANCE),
                )),
            }
            match minimum_c {
                None => failures.push(Failure::missing_object(
                    RULE,
                    name,
                    "a minimum setpoint temperature",
                )),
                Some(minimum_c) => failures.extend(check_value(
                    RULE,
                    name,
                    "minimum setpoint temperature",
                    MINIMUM_SETPOINT_F,
                    celsius_to_fahrenheit(minimum_c),
                    Some("F"),
                    Tolerance::Absolute(CONDENSER_TOLERANCE),
                )),
            }
        }
    }

    for tower in facade.cooling_towers_on(plant_loop) {
        check_tower(tower, wet_bulb_f, approach_r, failures);
    }
}

fn check_tower(
    tower: &PlantComponent,
    wet_bulb_f: f64,
    approach_r: f64,
    failures: &mut Vec<Failure>,
) {
    let PlantComponent::CoolingTower {
        name,
        design_inlet_air_wet_bulb_temperature_c,
        design_approach_temperature_k,
        design_range_temperature_k,
    } = tower
    else {
        return;
    };
    match design_inlet_air_wet_bulb_temperature_c {
        None => failures.push(Failure::missing_object(
            RULE,
            name,
            "a design inlet air wet-bulb temperature",
        )),
        Some(inlet_c) => failures.extend(check_value(
            RULE,
            name,
            "design inlet air wet-bulb",
            tower_design_wet_bulb_f(wet_bulb_f),
            celsius_to_fahrenheit(*inlet_c),
            Some("F"),
            Tolerance::Absolute(CONDENSER_TOLERANCE),
        )),
    }
    match design_approach_temperature_k {
        None => failures.push(Failure::missing_object(RULE, name, "a design approach")),
        Some(approach_k) => failures.extend(check_value(
            RULE,
            name,
            "design approach",
            approach_r,
            delta_kelvin_to_rankine(*approach_k),
            Some("R"),
            Tolerance::Absolute(CONDENSER_TOLERANCE),
        )),
    }
    match design_range_temperature_k {
        None => failures.push(Failure::missing_object(RULE, name, "a design range")),
        Some(range_k) => failures.extend(check_value(
            RULE,
            name,
            "design range",
            TOWER_DESIGN_RANGE_R,
            delta_kelvin_to_rankine(*range_k),
            Some("R"),
            Tolerance::Absolute(CONDENSER_TOLERANCE),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ingest_model, BuildingModel};
    use crate::report::FailureKind;
    use crate::scenario::{ScenarioContext, ScenarioSpec};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    fn context() -> ScenarioContext {
        ScenarioContext::new(
            &serde_json::from_value::<ScenarioSpec>(json!({
                "BuildingType": "SmallOffice",
                "Template": "90.1-2013",
                "ClimateZone": "5B",
                "BaselineModel": "unused.json"
            }))
            .unwrap(),
        )
    }

    fn model(plant_loops: serde_json::Value) -> BuildingModel {
        ingest_model(
            json!({
                "Building": {"Name": "b", "FloorAreaM2": 100.0, "Stories": 1},
                "ThermalZones": {},
                "AirSystems": {},
                "PlantLoops": plant_loops
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    fn compliant_hot_water_loop() -> serde_json::Value {
        json!({
            "LoopType": "Heating",
            "Sizing": {
                "DesignLoopExitTemperatureC": 82.2222,
                "LoopDesignTemperatureDifferenceK": 27.7778,
                "SizingFactor": 1.25
            },
            "SupplyComponents": [
                {"Type": "Boiler", "Name": "Boiler 1", "NominalCapacityW": 50_000.0,
                 "ThermalEfficiency": 0.8}
            ],
            "SetpointManagers": [
                {"Type": "OutdoorAirReset", "Name": "HW Temp Reset",
                 "SetpointAtOutdoorLowTemperatureC": 82.2222,
                 "OutdoorLowTemperatureC": -6.6667,
                 "SetpointAtOutdoorHighTemperatureC": 65.5556,
                 "OutdoorHighTemperatureC": 10.0}
            ]
        })
    }

    #[rstest]
    fn compliant_hot_water_loop_passes() {
        let model = model(json!({"Hot Water Loop": compliant_hot_water_loop()}));
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    fn service_water_loops_are_ignored() {
        let model = model(json!({
            "Service Water Heating Loop": {"LoopType": "Heating"}
        }));
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    fn wrong_exit_temperature_reports_in_fahrenheit() {
        let mut lp = compliant_hot_water_loop();
        lp["Sizing"]["DesignLoopExitTemperatureC"] = json!(60.0);
        let model = model(json!({"Hot Water Loop": lp}));
        let failures = evaluate(&ModelFacade::new(&model), &context());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].expected, "180");
        assert_eq!(failures[0].actual, "140");
    }

    #[rstest]
    fn missing_reset_manager_is_reported_when_loop_has_a_boiler() {
        let mut lp = compliant_hot_water_loop();
        lp["SetpointManagers"] = json!([]);
        let model = model(json!({"Hot Water Loop": lp}));
        let failures = evaluate(&ModelFacade::new(&model), &context());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::MissingObject);
    }

    #[rstest]
    fn secondary_cooling_loop_needs_no_reset() {
        let model = model(json!({
            "Chilled Water Loop": {
                "LoopType": "Cooling",
                "Sizing": {
                    "DesignLoopExitTemperatureC": 6.6667,
                    "LoopDesignTemperatureDifferenceK": 6.6667
                },
                "SupplyComponents": [
                    {"Type": "HeatExchanger", "Name": "CHW HX"}
                ]
            }
        }));
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    fn condenser_loop(wet_bulb_f: f64) -> serde_json::Value {
        let approach_r = design_approach_r(wet_bulb_f);
        json!({
            "LoopType": "Condenser",
            "Sizing": {},
            "SupplyComponents": [
                {"Type": "CoolingTower", "Name": "Tower 1",
                 "DesignInletAirWetBulbTemperatureC": fahrenheit_to_celsius(tower_design_wet_bulb_f(wet_bulb_f)),
                 "DesignApproachTemperatureK": approach_r / 1.8,
                 "DesignRangeTemperatureK": 10.0 / 1.8}
            ],
            "SetpointManagers": [
                {"Type": "FollowOutdoorAirTemperature", "Name": "CW SPM",
                 "ControlVariable": "Temperature",
                 "ReferenceTemperatureType": "OutdoorAirWetBulb",
                 "OffsetTemperatureDifferenceK": approach_r / 1.8,
                 "MaximumSetpointTemperatureC": fahrenheit_to_celsius(maximum_setpoint_f(wet_bulb_f)),
                 "MinimumSetpointTemperatureC": fahrenheit_to_celsius(70.0)}
            ]
        })
    }

    #[rstest]
    fn condenser_loop_without_design_days_uses_the_default_wet_bulb() {
        let model = model(json!({"Condenser Loop": condenser_loop(78.0)}));
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    fn condenser_setpoints_follow_the_site_wet_bulb() {
        // 18 C = 64.4 F design wet-bulb; approach and setpoints shift with it
        // and the tower design wet-bulb pins to its 68 F floor
        let doc = json!({
            "Building": {"Name": "b", "FloorAreaM2": 100.0, "Stories": 1},
            "ThermalZones": {},
            "AirSystems": {},
            "PlantLoops": {"Condenser Loop": condenser_loop(64.4)},
            "DesignDays": [
                {"Name": "Ann Clg .4% Condns WB=>MDB", "DayType": "SummerDesignDay",
                 "HumidityIndicatingType": "Wetbulb", "WetBulbAtMaximumDryBulbC": 18.0}
            ]
        });
        let model: BuildingModel = ingest_model(doc.to_string().as_bytes()).unwrap();
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    fn wrong_reference_type_on_condenser_manager_fails() {
        let mut lp = condenser_loop(78.0);
        lp["SetpointManagers"][0]["ReferenceTemperatureType"] = json!("OutdoorAirDryBulb");
        let model = model(json!({"Condenser Loop": lp}));
        let failures = evaluate(&ModelFacade::new(&model), &context());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.contains("OutdoorAirWetBulb"));
    }
}
