//! Unitary equipment efficiency (G3.1.2.1): DX coil COPs against the
//! capacity-banded minimum-efficiency tables, gas coil burner efficiency, and
//! boiler thermal efficiency.

use crate::core::access::ModelFacade;
use crate::core::compare::{check_value, Tolerance};
use crate::core::formulas::efficiency::{
    baseline_cooling_cop, baseline_heating_cop, boiler_thermal_efficiency, eer_to_cop_full_load,
    gas_coil_burner_efficiency, ptac_cooling_eer, pthp_heating_cop,
};
use crate::core::units::watts_to_btu_per_hour;
use crate::input::{Coil, PlantComponent, PlantLoopType, ZoneEquipment};
use crate::report::{Failure, RuleId};
use crate::scenario::ScenarioContext;

const RULE: RuleId = RuleId::CoilEfficiency;

const SINGLE_SPEED_COP_TOLERANCE: f64 = 0.1;
const TWO_SPEED_COP_TOLERANCE: f64 = 0.02;
const HEATING_COP_TOLERANCE: f64 = 0.02;
const PACKAGED_COP_TOLERANCE: f64 = 0.1;
const THERMAL_EFFICIENCY_TOLERANCE: f64 = 0.001;

pub fn evaluate(facade: &ModelFacade, _context: &ScenarioContext) -> Vec<Failure> {
    let mut failures = Vec::new();
    for (_, system) in facade.air_systems() {
        for coil in &system.coils {
            check_system_coil(coil, &mut failures);
        }
    }
    for (_, zone) in facade.thermal_zones() {
        for equipment in &zone.equipment {
            check_packaged_terminal(equipment, &mut failures);
        }
    }
    for (_, plant_loop) in facade.hvac_loops_of_type(PlantLoopType::Heating) {
        for boiler in facade.boilers_on(plant_loop) {
            check_boiler(boiler, &mut failures);
        }
    }
    failures
}

fn check_system_coil(coil: &Coil, failures: &mut Vec<Failure>) {
    match coil {
        Coil::DxCoolingSingleSpeed { .. } => {
            check_dx_cooling(coil, SINGLE_SPEED_COP_TOLERANCE, failures)
        }
        Coil::DxCoolingTwoSpeed { .. } => check_dx_cooling(coil, TWO_SPEED_COP_TOLERANCE, failures),
        Coil::DxHeatingSingleSpeed { .. } => check_dx_heating(coil, failures),
        Coil::GasHeating {
            name,
            burner_efficiency,
            ..
        } => {
            let Some(capacity_btu) = coil.capacity_w().map(watts_to_btu_per_hour) else {
                failures.push(Failure::missing_object(RULE, name, "a rated heating capacity"));
                return;
            };
            let Some(actual) = burner_efficiency else {
                failures.push(Failure::missing_object(RULE, name, "a burner efficiency"));
                return;
            };
            failures.extend(check_value(
                RULE,
                name,
                "burner efficiency",
                gas_coil_burner_efficiency(capacity_btu),
                *actual,
                None,
                Tolerance::Absolute(THERMAL_EFFICIENCY_TOLERANCE),
            ));
        }
        // hydronic coils are covered by the plant rules; electric resistance
        // has nothing to rate
        Coil::ElectricHeating { .. } | Coil::WaterHeating { .. } | Coil::WaterCooling { .. } => {}
    }
}

fn check_dx_cooling(coil: &Coil, tolerance: f64, failures: &mut Vec<Failure>) {
    let name = coil.name();
    let Some(capacity_btu) = coil.capacity_w().map(watts_to_btu_per_hour) else {
        failures.push(Failure::missing_object(RULE, name, "a rated cooling capacity"));
        return;
    };
    let Some(actual_cop) = coil.rated_cop() else {
        failures.push(Failure::missing_object(RULE, name, "a rated COP"));
        return;
    };
    failures.extend(check_value(
        RULE,
        name,
        "cooling COP",
        baseline_cooling_cop(capacity_btu),
        actual_cop,
        None,
        Tolerance::Absolute(tolerance),
    ));
}

fn check_dx_heating(coil: &Coil, failures: &mut Vec<Failure>) {
    let name = coil.name();
    let Some(capacity_btu) = coil.capacity_w().map(watts_to_btu_per_hour) else {
        failures.push(Failure::missing_object(RULE, name, "a rated heating capacity"));
        return;
    };
    let Some(actual_cop) = coil.rated_cop() else {
        failures.push(Failure::missing_object(RULE, name, "a rated COP"));
        return;
    };
    failures.extend(check_value(
        RULE,
        name,
        "heating COP",
        baseline_heating_cop(capacity_btu),
        actual_cop,
        None,
        Tolerance::Absolute(HEATING_COP_TOLERANCE),
    ));
}

/// PTAC/PTHP coils rate against the capacity-interpolated packaged-terminal
/// rows rather than the unitary tables.
fn check_packaged_terminal(equipment: &ZoneEquipment, failures: &mut Vec<Failure>) {
    let (cooling_coil, heating_coil) = match equipment {
        ZoneEquipment::Ptac { cooling_coil, .. } => (cooling_coil.as_ref(), None),
        ZoneEquipment::Pthp {
            cooling_coil,
            heating_coil,
            ..
        } => (cooling_coil.as_ref(), heating_coil.as_ref()),
        _ => return,
    };
    if let Some(coil) = cooling_coil {
        check_packaged_cooling(coil, failures);
    }
    if let Some(coil) = heating_coil {
        if matches!(coil, Coil::DxHeatingSingleSpeed { .. }) {
            check_packaged_heating(coil, failures);
        }
    }
}

fn check_packaged_cooling(coil: &Coil, failures: &mut Vec<Failure>) {
    let name = coil.name();
    let Some(capacity_btu) = coil.capacity_w().map(watts_to_btu_per_hour) else {
        failures.push(Failure::missing_object(RULE, name, "a rated cooling capacity"));
        return;
    };
    let Some(actual_cop) = coil.rated_cop() else {
        failures.push(Failure::missing_object(RULE, name, "a rated COP"));
        return;
    };
    let expected = eer_to_cop_full_load(ptac_cooling_eer(capacity_btu), capacity_btu);
    failures.extend(check_value(
        RULE,
        name,
        "cooling COP",
        expected,
        actual_cop,
        None,
        Tolerance::Absolute(PACKAGED_COP_TOLERANCE),
    ));
}

fn check_packaged_heating(coil: &Coil, failures: &mut Vec<Failure>) {
    let name = coil.name();
    let Some(capacity_btu) = coil.capacity_w().map(watts_to_btu_per_hour) else {
        failures.push(Failure::missing_object(RULE, name, "a rated heating capacity"));
        return;
    };
    let Some(actual_cop) = coil.rated_cop() else {
        failures.push(Failure::missing_object(RULE, name, "a rated COP"));
        return;
    };
    failures.extend(check_value(
        RULE,
        name,
        "heating COP",
        pthp_heating_cop(capacity_btu),
        actual_cop,
        None,
        Tolerance::Absolute(PACKAGED_COP_TOLERANCE),
    ));
}

fn check_boiler(boiler: &PlantComponent, failures: &mut Vec<Failure>) {
    let PlantComponent::Boiler {
        name,
        nominal_capacity_w,
        capacity_autosized,
        thermal_efficiency,
    } = boiler
    else {
        return;
    };
    let Some(capacity_btu) = nominal_capacity_w.map(watts_to_btu_per_hour) else {
        if !capacity_autosized {
            failures.push(Failure::missing_object(RULE, name, "a boiler capacity"));
        }
        return;
    };
    let Some(actual) = thermal_efficiency else {
        failures.push(Failure::missing_object(RULE, name, "a thermal efficiency"));
        return;
    };
    failures.extend(check_value(
        RULE,
        name,
        "thermal efficiency",
        boiler_thermal_efficiency(capacity_btu),
        *actual,
        None,
        Tolerance::Absolute(THERMAL_EFFICIENCY_TOLERANCE),
    ));
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

    fn model_with_system_coils(coils: serde_json::Value) -> BuildingModel {
        ingest_model(
            json!({
                "Building": {"Name": "b", "FloorAreaM2": 100.0, "Stories": 1},
                "ThermalZones": {},
                "AirSystems": {"PSZ-AC (Sys3)": {"Coils": coils}}
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    #[rstest]
    fn compliant_single_speed_dx_cooling_passes() {
        // 15 kW = 51,182 Btu/h: SEER 14 band
        let expected = baseline_cooling_cop(watts_to_btu_per_hour(15_000.));
        let model = model_with_system_coils(json!([
            {"Type": "DxCoolingSingleSpeed", "Name": "Clg Coil",
             "AutosizedCapacityW": 15_000.0, "RatedCop": expected}
        ]));
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    fn two_speed_coil_uses_the_tighter_tolerance() {
        let capacity_w = 40_000.0; // 136.5 kBtu/h: EER 10.8 band
        let expected = baseline_cooling_cop(watts_to_btu_per_hour(capacity_w));
        let model = model_with_system_coils(json!([
            {"Type": "DxCoolingTwoSpeed", "Name": "Clg Coil",
             "AutosizedHighSpeedCapacityW": capacity_w,
             "RatedHighSpeedCop": expected + 0.05}
        ]));
        let failures = evaluate(&ModelFacade::new(&model), &context());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::ValueMismatch);
    }

    #[rstest]
    fn dx_heating_follows_the_heating_table() {
        let capacity_w = 30_000.0; // 102 kBtu/h: COP47 3.3 band
        let expected = baseline_heating_cop(watts_to_btu_per_hour(capacity_w));
        let model = model_with_system_coils(json!([
            {"Type": "DxHeatingSingleSpeed", "Name": "Htg Coil",
             "AutosizedCapacityW": capacity_w, "RatedCop": expected}
        ]));
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    fn gas_coil_burner_efficiency_is_checked_exactly() {
        let model = model_with_system_coils(json!([
            {"Type": "GasHeating", "Name": "Gas Htg Coil",
             "NominalCapacityW": 50_000.0, "BurnerEfficiency": 0.78}
        ]));
        let failures = evaluate(&ModelFacade::new(&model), &context());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].expected, "0.8");
    }

    #[rstest]
    fn ptac_cooling_uses_the_packaged_terminal_row() {
        // 10 kBtu/h: EER 13.8 - 0.3*10 = 10.8
        let capacity_w = 10_000.0 / 3.412141633;
        let expected = eer_to_cop_full_load(10.8, 10_000.0);
        let model = ingest_model(
            json!({
                "Building": {"Name": "b", "FloorAreaM2": 100.0, "Stories": 1},
                "ThermalZones": {
                    "Zone 1": {
                        "FloorAreaM2": 100.0,
                        "Equipment": [
                            {"Type": "Ptac", "Name": "Zone 1 PTAC",
                             "CoolingCoil": {"Type": "DxCoolingSingleSpeed", "Name": "PTAC Clg Coil",
                                             "RatedCapacityW": capacity_w, "RatedCop": expected}}
                        ]
                    }
                },
                "AirSystems": {}
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    #[case(50_000.0, 0.80)]
    #[case(150_000.0, 0.75)]
    fn boiler_thermal_efficiency_by_capacity(#[case] capacity_w: f64, #[case] expected: f64) {
        let model = ingest_model(
            json!({
                "Building": {"Name": "b", "FloorAreaM2": 100.0, "Stories": 1},
                "ThermalZones": {},
                "AirSystems": {},
                "PlantLoops": {
                    "Hot Water Loop": {
                        "LoopType": "Heating",
                        "SupplyComponents": [
                            {"Type": "Boiler", "Name": "Boiler 1",
                             "NominalCapacityW": capacity_w, "ThermalEfficiency": expected}
                        ]
                    }
                }
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();
        assert_eq!(evaluate(&ModelFacade::new(&model), &context()), vec![]);
    }

    #[rstest]
    fn coil_without_capacity_is_a_missing_object() {
        let model = model_with_system_coils(json!([
            {"Type": "DxCoolingSingleSpeed", "Name": "Clg Coil", "RatedCop": 3.0}
        ]));
        let failures = evaluate(&ModelFacade::new(&model), &context());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::MissingObject);
    }
}
