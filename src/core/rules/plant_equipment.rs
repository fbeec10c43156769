//! Plant equipment counts, types and pumping power (G3.1.3.2, .7, .10, .11,
//! .15): boiler and chiller counts by served area and plant capacity,
//! compressor type, chiller COP by the Path A table, the single cooling
//! tower, and every loop's pump W/gpm targets and part-load curves.

use crate::core::access::ModelFacade;
use crate::core::compare::{check_value, fmt_value, Tolerance};
use crate::core::formulas::plant_counts::{
    expected_boiler_count, expected_chiller_plant, expected_cooling_tower_count, kw_per_ton_to_cop,
    path_a_kw_per_ton, CompressorType,
};
use crate::core::formulas::pumps::{
    pump_watts_per_gpm, CHILLED_WATER_DEMAND_WATTS_PER_GPM, CHILLED_WATER_SUPPLY_WATTS_PER_GPM,
    CHILLED_WATER_VSD_THRESHOLD_TONS, CONDENSER_WATER_WATTS_PER_GPM,
    DISTRICT_CHILLED_WATER_WATTS_PER_GPM, DISTRICT_HOT_WATER_WATTS_PER_GPM,
    HOT_WATER_VSD_THRESHOLD_FT2, HOT_WATER_WATTS_PER_GPM, RIDING_CURVE_COEFFICIENTS,
    VSD_COEFFICIENTS,
};
use crate::core::units::watts_to_tons;
use crate::input::{PlantComponent, PlantLoop, PlantLoopType, PumpSpeedControl};
use crate::report::{Failure, RuleId};
use crate::scenario::ScenarioContext;
use itertools::Itertools;

const RULE: RuleId = RuleId::PlantEquipment;

const COP_TOLERANCE: f64 = 0.05;
const WATTS_PER_GPM_TOLERANCE: f64 = 0.05;
const COEFFICIENT_TOLERANCE: f64 = 0.01;
const CAPACITY_MATCH_TOLERANCE: f64 = 0.001;

pub fn evaluate(facade: &ModelFacade, _context: &ScenarioContext) -> Vec<Failure> {
    let mut failures = Vec::new();
    check_boiler_plants(facade, &mut failures);
    check_chiller_plants(facade, &mut failures);
    check_condenser_plants(facade, &mut failures);
    failures
}

fn check_boiler_plants(facade: &ModelFacade, failures: &mut Vec<Failure>) {
    let boiler_loops: Vec<_> = facade
        .hvac_loops_of_type(PlantLoopType::Heating)
        .filter(|(_, lp)| !facade.boilers_on(lp).is_empty())
        .collect();
    if boiler_loops.len() > 1 {
        failures.push(Failure::ambiguous_model(
            RULE,
            "hot water plant",
            format!("{} loops carry boilers", boiler_loops.len()),
        ));
    }
    for (name, plant_loop) in &boiler_loops {
        let boilers = facade.boilers_on(plant_loop);
        let expected = expected_boiler_count(facade.floor_area_served_ft2(name));
        if boilers.len() != expected {
            failures.push(Failure::value_mismatch(
                RULE,
                name,
                "boiler count",
                expected,
                boilers.len(),
                None,
            ));
        }
        if expected == 2 && boilers.len() == 2 {
            check_equal_boiler_sizing(name, &boilers, failures);
        }
    }
    for (name, plant_loop) in facade.hvac_loops_of_type(PlantLoopType::Heating) {
        check_hot_water_pumps(facade, name, plant_loop, failures);
    }
}

fn check_equal_boiler_sizing(
    loop_name: &str,
    boilers: &[&PlantComponent],
    failures: &mut Vec<Failure>,
) {
    let capacities: Vec<Option<f64>> = boilers
        .iter()
        .map(|b| match b {
            PlantComponent::Boiler {
                nominal_capacity_w, ..
            } => *nominal_capacity_w,
            _ => None,
        })
        .collect();
    match (capacities[0], capacities[1]) {
        // both autosized counts as equally sized
        (None, None) => {}
        (Some(first), Some(second)) => {
            failures.extend(check_value(
                RULE,
                loop_name,
                "matching boiler capacity",
                first,
                second,
                Some("W"),
                Tolerance::Relative(CAPACITY_MATCH_TOLERANCE),
            ));
        }
        _ => failures.push(Failure::ambiguous_model(
            RULE,
            loop_name,
            "one boiler hard-sized, one autosized",
        )),
    }
}

fn check_chiller_plants(facade: &ModelFacade, failures: &mut Vec<Failure>) {
    for (name, plant_loop) in facade.hvac_loops_of_type(PlantLoopType::Cooling) {
        let chillers = facade.chillers_on(plant_loop);
        let district = plant_loop
            .supply_components
            .iter()
            .any(|c| matches!(c, PlantComponent::DistrictCooling { .. }));
        if chillers.is_empty() {
            if district {
                check_district_chilled_water_pumps(name, plant_loop, failures);
            }
            continue;
        }
        let Some(total_tons) = facade.total_chiller_capacity_tons(plant_loop) else {
            failures.push(Failure::missing_object(
                RULE,
                name,
                "reference capacities on every chiller",
            ));
            continue;
        };
        let (expected_count, expected_compressor) = expected_chiller_plant(total_tons);
        if chillers.len() != expected_count {
            failures.push(Failure::value_mismatch(
                RULE,
                name,
                &format!("chiller count for a {} ton plant", fmt_value(total_tons)),
                expected_count,
                chillers.len(),
                None,
            ));
        }
        for chiller in &chillers {
            check_chiller(chiller, expected_compressor, failures);
        }
        check_chilled_water_pumps(facade, name, plant_loop, total_tons, expected_count, failures);
    }
}

fn check_chiller(
    chiller: &PlantComponent,
    expected_compressor: CompressorType,
    failures: &mut Vec<Failure>,
) {
    let PlantComponent::Chiller {
        name,
        reference_cop,
        reference_capacity_w,
        capacity_curve,
        energy_input_ratio_curve,
        part_load_curve,
        ..
    } = chiller
    else {
        return;
    };
    // the generator encodes the compressor type in its performance curve names
    let actual_compressor = if [capacity_curve, energy_input_ratio_curve, part_load_curve]
        .iter()
        .any(|curve| curve.as_deref().is_some_and(|c| c.contains("Cent")))
    {
        CompressorType::Centrifugal
    } else {
        CompressorType::PositiveDisplacement
    };
    if actual_compressor != expected_compressor {
        failures.push(Failure::value_mismatch(
            RULE,
            name,
            "compressor type",
            format!("{expected_compressor:?}"),
            format!("{actual_compressor:?}"),
            None,
        ));
    }
    let Some(tons) = reference_capacity_w.map(watts_to_tons) else {
        failures.push(Failure::missing_object(RULE, name, "a reference capacity"));
        return;
    };
    let Some(actual_cop) = reference_cop else {
        failures.push(Failure::missing_object(RULE, name, "a reference COP"));
        return;
    };
    failures.extend(check_value(
        RULE,
        name,
        "chiller COP",
        kw_per_ton_to_cop(path_a_kw_per_ton(tons)),
        *actual_cop,
        None,
        Tolerance::Absolute(COP_TOLERANCE),
    ));
}

fn check_condenser_plants(facade: &ModelFacade, failures: &mut Vec<Failure>) {
    // chillers reference their condenser loop by name
    let condenser_chiller_counts: Vec<(&str, usize)> = facade
        .hvac_loops_of_type(PlantLoopType::Cooling)
        .flat_map(|(_, lp)| facade.chillers_on(lp))
        .filter_map(|chiller| match chiller {
            PlantComponent::Chiller {
                condenser_loop: Some(condenser_loop),
                ..
            } => Some(condenser_loop.as_str()),
            _ => None,
        })
        .counts()
        .into_iter()
        .collect();
    for (name, plant_loop) in facade.hvac_loops_of_type(PlantLoopType::Condenser) {
        let towers = facade.cooling_towers_on(plant_loop);
        if towers.len() != expected_cooling_tower_count() {
            failures.push(Failure::value_mismatch(
                RULE,
                name,
                "cooling tower count",
                expected_cooling_tower_count(),
                towers.len(),
                None,
            ));
        }
        let chillers_served = condenser_chiller_counts
            .iter()
            .find_map(|(loop_name, count)| (*loop_name == name).then_some(*count))
            .unwrap_or(1);
        check_pump_bank(
            name,
            &facade.pumps_on(&plant_loop.supply_components, None),
            PumpSpeedControl::ConstantSpeed,
            chillers_served,
            CONDENSER_WATER_WATTS_PER_GPM,
            None,
            failures,
        );
    }
}

fn check_chilled_water_pumps(
    facade: &ModelFacade,
    name: &str,
    plant_loop: &PlantLoop,
    total_tons: f64,
    expected_chiller_count: usize,
    failures: &mut Vec<Failure>,
) {
    // one constant-speed pump per chiller on the supply side
    check_pump_bank(
        name,
        &facade.pumps_on(&plant_loop.supply_components, None),
        PumpSpeedControl::ConstantSpeed,
        expected_chiller_count,
        CHILLED_WATER_SUPPLY_WATTS_PER_GPM,
        None,
        failures,
    );
    // one variable-speed distribution pump on the demand side, riding the
    // curve for small plants and on a VSD above the threshold
    let coefficients = if total_tons < CHILLED_WATER_VSD_THRESHOLD_TONS {
        &RIDING_CURVE_COEFFICIENTS
    } else {
        &VSD_COEFFICIENTS
    };
    check_pump_bank(
        name,
        &facade.pumps_on(&plant_loop.demand_components, None),
        PumpSpeedControl::VariableSpeed,
        1,
        CHILLED_WATER_DEMAND_WATTS_PER_GPM,
        Some(coefficients),
        failures,
    );
}

fn check_district_chilled_water_pumps(
    name: &str,
    plant_loop: &PlantLoop,
    failures: &mut Vec<Failure>,
) {
    let pumps: Vec<&PlantComponent> = plant_loop
        .supply_components
        .iter()
        .filter(|c| matches!(c, PlantComponent::Pump { .. }))
        .collect();
    check_pump_bank(
        name,
        &pumps,
        PumpSpeedControl::VariableSpeed,
        1,
        DISTRICT_CHILLED_WATER_WATTS_PER_GPM,
        None,
        failures,
    );
}

fn check_hot_water_pumps(
    facade: &ModelFacade,
    name: &str,
    plant_loop: &PlantLoop,
    failures: &mut Vec<Failure>,
) {
    let has_boilers = !facade.boilers_on(plant_loop).is_empty();
    let district = plant_loop
        .supply_components
        .iter()
        .any(|c| matches!(c, PlantComponent::DistrictHeating { .. }));
    if !has_boilers && !district {
        return;
    }
    let target = if district {
        DISTRICT_HOT_WATER_WATTS_PER_GPM
    } else {
        HOT_WATER_WATTS_PER_GPM
    };
    let coefficients = if has_boilers {
        Some(
            if facade.floor_area_served_ft2(name) < HOT_WATER_VSD_THRESHOLD_FT2 {
                &RIDING_CURVE_COEFFICIENTS
            } else {
                &VSD_COEFFICIENTS
            },
        )
    } else {
        None
    };
    check_pump_bank(
        name,
        &facade.pumps_on(&plant_loop.supply_components, None),
        PumpSpeedControl::VariableSpeed,
        1,
        target,
        coefficients,
        failures,
    );
}

/// Count, speed control, specific power and (optionally) part-load curve for
/// the pumps in one position on a loop.
fn check_pump_bank(
    loop_name: &str,
    pumps: &[&PlantComponent],
    expected_control: PumpSpeedControl,
    expected_count: usize,
    target_watts_per_gpm: f64,
    expected_coefficients: Option<&[f64; 4]>,
    failures: &mut Vec<Failure>,
) {
    let total: usize = pumps
        .iter()
        .map(|p| match p {
            PlantComponent::Pump { pumps_in_bank, .. } => {
                pumps_in_bank.map(|n| n as usize).unwrap_or(1)
            }
            _ => 0,
        })
        .sum();
    if total != expected_count {
        failures.push(Failure::value_mismatch(
            RULE,
            loop_name,
            "pump count",
            expected_count,
            total,
            None,
        ));
    }
    for pump in pumps {
        let PlantComponent::Pump {
            name,
            speed_control,
            motor_efficiency,
            rated_head_pa,
            part_load_coefficients,
            ..
        } = pump
        else {
            continue;
        };
        if *speed_control != expected_control {
            failures.push(Failure::value_mismatch(
                RULE,
                name,
                "pump speed control",
                format!("{expected_control:?}"),
                format!("{speed_control:?}"),
                None,
            ));
        }
        let (Some(rated_head_pa), Some(motor_efficiency)) = (rated_head_pa, motor_efficiency)
        else {
            failures.push(Failure::missing_object(
                RULE,
                name,
                "a rated head and motor efficiency",
            ));
            continue;
        };
        failures.extend(check_value(
            RULE,
            name,
            "pump power",
            target_watts_per_gpm,
            pump_watts_per_gpm(*rated_head_pa, *motor_efficiency),
            Some("W/gpm"),
            Tolerance::Absolute(WATTS_PER_GPM_TOLERANCE),
        ));
        if let Some(expected_coefficients) = expected_coefficients {
            check_part_load_curve(name, part_load_coefficients, expected_coefficients, failures);
        }
    }
}

fn check_part_load_curve(
    pump_name: &str,
    actual: &Option<Vec<f64>>,
    expected: &[f64; 4],
    failures: &mut Vec<Failure>,
) {
    let Some(actual) = actual else {
        failures.push(Failure::missing_object(
            RULE,
            pump_name,
            "part-load performance coefficients",
        ));
        return;
    };
    for (index, expected_coefficient) in expected.iter().enumerate() {
        failures.extend(check_value(
            RULE,
            format!("{pump_name} coefficient {}", index + 1),
            "part-load coefficient",
            *expected_coefficient,
            actual.get(index).copied().unwrap_or_default(),
            None,
            Tolerance::Absolute(COEFFICIENT_TOLERANCE),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formulas::pumps::rated_head_for_watts_per_gpm;
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

    fn tons_to_watts(tons: f64) -> f64 {
        tons * 12_000. / 3.412141633
    }

    fn supply_pump(name: &str, target: f64) -> serde_json::Value {
        json!({"Type": "Pump", "Name": name, "SpeedControl": "ConstantSpeed",
               "MotorEfficiency": 0.9,
               "RatedHeadPa": rated_head_for_watts_per_gpm(target, 0.9)})
    }

    fn demand_pump(name: &str, target: f64, coefficients: &[f64; 4]) -> serde_json::Value {
        json!({"Type": "Pump", "Name": name, "SpeedControl": "VariableSpeed",
               "MotorEfficiency": 0.9,
               "RatedHeadPa": rated_head_for_watts_per_gpm(target, 0.9),
               "PartLoadCoefficients": coefficients})
    }

    fn small_chiller_plant() -> serde_json::Value {
        let cop = kw_per_ton_to_cop(path_a_kw_per_ton(200.));
        json!({
            "Chilled Water Loop": {
                "LoopType": "Cooling",
                "SupplyComponents": [
                    {"Type": "Chiller", "Name": "Chiller 1", "ReferenceCop": cop,
                     "ReferenceCapacityW": tons_to_watts(200.),
                     "CapacityCurve": "ChlrWtrPosDispPathAAllCapFT"},
                    supply_pump("CHW Supply Pump", 9.0)
                ],
                "DemandComponents": [
                    demand_pump("CHW Distribution Pump", 13.0, &RIDING_CURVE_COEFFICIENTS)
                ]
            }
        })
    }

    fn model(plant_loops: serde_json::Value) -> BuildingModel {
        ingest_model(
            json!({
                "Building": {"Name": "b", "FloorAreaM2": 2000.0, "Stories": 1},
                "ThermalZones": {},
                "AirSystems": {},
                "PlantLoops": plant_loops
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    #[rstest]
    fn compliant_small_chiller_plant_passes() {
        let model = model(small_chiller_plant());
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    fn mid_size_plant_wants_two_chillers() {
        let mut plant = small_chiller_plant();
        let loop_ = &mut plant["Chilled Water Loop"];
        loop_["SupplyComponents"][0]["ReferenceCapacityW"] = json!(tons_to_watts(450.));
        let model = model(plant);
        let failures = evaluate(&ModelFacade::new(&model), &context());
        // one chiller where two are expected, one supply pump where two are
        // expected, and the demand pump rides the curve where a VSD is due
        assert!(failures
            .iter()
            .any(|f| f.message.contains("chiller count") && f.expected == "2"));
        assert!(failures.iter().any(|f| f.message.contains("pump count")));
        assert!(failures
            .iter()
            .any(|f| f.object.contains("coefficient 2")));
    }

    #[rstest]
    fn large_plant_wants_centrifugal_machines() {
        // two 400-ton positive-displacement chillers in an 800-ton plant
        let cop = kw_per_ton_to_cop(path_a_kw_per_ton(400.));
        let chiller = |name: &str| {
            json!({"Type": "Chiller", "Name": name, "ReferenceCop": cop,
                   "ReferenceCapacityW": tons_to_watts(400.),
                   "CapacityCurve": "ChlrWtrPosDispPathAAllCapFT"})
        };
        let model = model(json!({
            "Chilled Water Loop": {
                "LoopType": "Cooling",
                "SupplyComponents": [
                    chiller("Chiller 1"), chiller("Chiller 2"),
                    supply_pump("CHW Pump 1", 9.0), supply_pump("CHW Pump 2", 9.0)
                ],
                "DemandComponents": [
                    demand_pump("CHW Distribution Pump", 13.0, &VSD_COEFFICIENTS)
                ]
            }
        }));
        let failures = evaluate(&ModelFacade::new(&model), &context());
        let compressor: Vec<_> = failures
            .iter()
            .filter(|f| f.message.contains("compressor type"))
            .collect();
        assert_eq!(compressor.len(), 2);
        assert!(compressor[0].message.contains("Centrifugal"));
    }

    #[rstest]
    fn boiler_count_follows_served_area() {
        // 2,000 m² (21,528 ft²) served: two boilers expected, one present
        let model = model(json!({
            "Hot Water Loop": {
                "LoopType": "Heating",
                "SupplyComponents": [
                    {"Type": "Boiler", "Name": "Boiler 1", "ThermalEfficiency": 0.8},
                    demand_pump("HW Supply Pump", 19.0, &RIDING_CURVE_COEFFICIENTS)
                ],
                "DemandComponents": [
                    {"Type": "WaterCoil", "Name": "Main Htg Coil", "Function": "Heating",
                     "Zone": "Zone 1"}
                ]
            }
        }));
        let mut big_zone_model = model.clone();
        big_zone_model
            .thermal_zones
            .insert("Zone 1".into(), serde_json::from_value(json!({"FloorAreaM2": 2000.0})).unwrap());
        let failures = evaluate(&ModelFacade::new(&big_zone_model), &context());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.contains("boiler count"));
        assert_eq!(failures[0].expected, "2");
    }

    #[rstest]
    fn unequal_boiler_pair_is_reported() {
        let model = model(json!({
            "Hot Water Loop": {
                "LoopType": "Heating",
                "SupplyComponents": [
                    {"Type": "Boiler", "Name": "Boiler 1", "NominalCapacityW": 100_000.0},
                    {"Type": "Boiler", "Name": "Boiler 2", "NominalCapacityW": 150_000.0},
                    demand_pump("HW Supply Pump", 19.0, &VSD_COEFFICIENTS)
                ],
                "DemandComponents": [
                    {"Type": "WaterCoil", "Name": "Main Htg Coil", "Function": "Heating",
                     "Zone": "Zone 1"}
                ]
            }
        }));
        let mut with_zone = model.clone();
        with_zone.thermal_zones.insert(
            "Zone 1".into(),
            serde_json::from_value(json!({"FloorAreaM2": 12_000.0})).unwrap(),
        );
        let failures = evaluate(&ModelFacade::new(&with_zone), &context());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.contains("matching boiler capacity"));
    }

    #[rstest]
    fn condenser_loop_gets_one_tower_and_per_chiller_pumps() {
        let cop = kw_per_ton_to_cop(path_a_kw_per_ton(200.));
        let model = model(json!({
            "Chilled Water Loop": {
                "LoopType": "Cooling",
                "SupplyComponents": [
                    {"Type": "Chiller", "Name": "Chiller 1", "ReferenceCop": cop,
                     "ReferenceCapacityW": tons_to_watts(200.),
                     "CapacityCurve": "ChlrWtrPosDispPathAAllCapFT",
                     "CondenserLoop": "Condenser Loop"},
                    supply_pump("CHW Supply Pump", 9.0)
                ],
                "DemandComponents": [
                    demand_pump("CHW Distribution Pump", 13.0, &RIDING_CURVE_COEFFICIENTS)
                ]
            },
            "Condenser Loop": {
                "LoopType": "Condenser",
                "SupplyComponents": [
                    {"Type": "CoolingTower", "Name": "Tower 1"},
                    supply_pump("CW Pump", 19.0)
                ]
            }
        }));
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    fn district_hot_water_uses_its_own_target() {
        let model = model(json!({
            "Hot Water Loop": {
                "LoopType": "Heating",
                "SupplyComponents": [
                    {"Type": "DistrictHeating", "Name": "District Heat"},
                    demand_pump("HW Pump", 14.0, &RIDING_CURVE_COEFFICIENTS)
                ]
            }
        }));
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }
}
