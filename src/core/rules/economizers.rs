//! Air economizers (G3.1.2.7): systems whose baseline type and climate zone
//! require one must use fixed dry-bulb control at the zone's high limit;
//! everything else must have exactly none.

use crate::core::access::ModelFacade;
use crate::core::compare::{check_token, check_value, same_token, Tolerance};
use crate::core::units::celsius_to_fahrenheit;
use crate::input::AirSystem;
use crate::report::{Failure, RuleId};
use crate::scenario::ScenarioContext;

const RULE: RuleId = RuleId::Economizers;
const HIGH_LIMIT_TOLERANCE_F: f64 = 0.1;
const EXPECTED_CONTROL_TYPE: &str = "FixedDryBulb";
const NO_ECONOMIZER: &str = "NoEconomizer";

pub fn evaluate(facade: &ModelFacade, context: &ScenarioContext) -> Vec<Failure> {
    let mut failures = Vec::new();
    for (name, system) in facade.air_systems() {
        let Some(system_type) = facade.classify_system(name, system).resolved() else {
            tracing::debug!("skipping {name}: no recognisable baseline system type");
            continue;
        };
        let required = system_type.economizer_eligible()
            && context.climate_zone.economizer_high_limit_f().is_some()
            && !has_exception(system);
        if required {
            check_required(facade, context, name, system, &mut failures);
        } else {
            check_absent(name, system, &mut failures);
        }
    }
    failures
}

/// The named exceptions that exempt an otherwise-eligible system.
fn has_exception(system: &AirSystem) -> bool {
    system.gas_phase_air_cleaning
        || system.open_refrigerated_casework
        || system.serves_computer_rooms
}

fn check_required(
    _facade: &ModelFacade,
    context: &ScenarioContext,
    name: &str,
    system: &AirSystem,
    failures: &mut Vec<Failure>,
) {
    let Some(oa_system) = system.outdoor_air_system.as_ref() else {
        failures.push(Failure::missing_object(
            RULE,
            name,
            "an outdoor-air system with an economizer",
        ));
        return;
    };
    match oa_system.economizer_control_type.as_deref() {
        None => failures.push(Failure::missing_object(RULE, name, "an economizer control type")),
        Some(actual) => failures.extend(check_token(
            RULE,
            name,
            "economizer control type",
            EXPECTED_CONTROL_TYPE,
            actual,
        )),
    }
    // the eligibility check above guarantees the zone has a high limit
    let Some(expected_limit_f) = context.climate_zone.economizer_high_limit_f() else {
        return;
    };
    match oa_system.economizer_maximum_limit_dry_bulb_temperature_c {
        None => failures.push(Failure::missing_object(
            RULE,
            name,
            "an economizer high-limit shutoff temperature",
        )),
        Some(limit_c) => failures.extend(check_value(
            RULE,
            name,
            "economizer high-limit shutoff",
            expected_limit_f,
            celsius_to_fahrenheit(limit_c),
            Some("F"),
            Tolerance::Absolute(HIGH_LIMIT_TOLERANCE_F),
        )),
    }
}

fn check_absent(name: &str, system: &AirSystem, failures: &mut Vec<Failure>) {
    let Some(oa_system) = system.outdoor_air_system.as_ref() else {
        return;
    };
    if let Some(actual) = oa_system.economizer_control_type.as_deref() {
        if !same_token(actual, NO_ECONOMIZER) {
            failures.push(Failure::unexpected_object(
                RULE,
                name,
                format!("economizer control type '{actual}'"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::system_type::ClimateZone;
    use crate::input::{ingest_model, BuildingModel};
    use crate::report::FailureKind;
    use crate::scenario::{ScenarioContext, ScenarioSpec};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    fn context_for(climate_zone: &str) -> ScenarioContext {
        ScenarioContext::new(
            &serde_json::from_value::<ScenarioSpec>(json!({
                "BuildingType": "SmallOffice",
                "Template": "90.1-2013",
                "ClimateZone": climate_zone,
                "BaselineModel": "unused.json"
            }))
            .unwrap(),
        )
    }

    fn model_with_economizer(control_type: &str, limit_c: f64) -> BuildingModel {
        ingest_model(
            json!({
                "Building": {"Name": "Office", "FloorAreaM2": 500.0, "Stories": 1},
                "ThermalZones": {"Core_ZN": {"FloorAreaM2": 500.0}},
                "AirSystems": {
                    "Core_ZN ZN PSZ-AC (Sys3)": {
                        "Zones": ["Core_ZN"],
                        "OutdoorAirSystem": {
                            "EconomizerControlType": control_type,
                            "EconomizerMaximumLimitDryBulbTemperatureC": limit_c
                        }
                    }
                }
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    #[rstest]
    fn compliant_economizer_in_a_dry_zone_passes() {
        let model = model_with_economizer("FixedDryBulb", 23.89);
        let failures = evaluate(&ModelFacade::new(&model), &context_for("5B"));
        assert_eq!(failures, vec![]);
    }

    #[rstest]
    fn missing_economizer_where_required_fails_once() {
        let model = model_with_economizer("NoEconomizer", 23.89);
        let failures = evaluate(&ModelFacade::new(&model), &context_for("5B"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::ValueMismatch);
        assert!(failures[0].message.contains("FixedDryBulb"));
    }

    #[rstest]
    fn wrong_high_limit_is_reported_in_fahrenheit() {
        // 21.0 C = 69.8 F against the 75 F requirement
        let model = model_with_economizer("FixedDryBulb", 21.0);
        let failures = evaluate(&ModelFacade::new(&model), &context_for("5B"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].expected, "75");
        assert_eq!(failures[0].units.as_deref(), Some("F"));
    }

    #[rstest]
    fn humid_zone_must_have_no_economizer() {
        let model = model_with_economizer("NoEconomizer", 23.89);
        assert_eq!(evaluate(&ModelFacade::new(&model), &context_for("1A")), vec![]);

        let model = model_with_economizer("FixedDryBulb", 23.89);
        let failures = evaluate(&ModelFacade::new(&model), &context_for("1A"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::UnexpectedObject);
    }

    #[rstest]
    fn colder_zones_use_the_seventy_degree_limit() {
        let model = model_with_economizer("FixedDryBulb", 21.11);
        assert_eq!(evaluate(&ModelFacade::new(&model), &context_for("6A")), vec![]);
    }

    #[rstest]
    fn gas_phase_air_cleaning_exempts_the_system() {
        let model = ingest_model(
            json!({
                "Building": {"Name": "Office", "FloorAreaM2": 500.0, "Stories": 1},
                "ThermalZones": {"Core_ZN": {"FloorAreaM2": 500.0}},
                "AirSystems": {
                    "Core_ZN ZN PSZ-AC (Sys3)": {
                        "Zones": ["Core_ZN"],
                        "GasPhaseAirCleaning": true,
                        "OutdoorAirSystem": {"EconomizerControlType": "NoEconomizer"}
                    }
                }
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();
        assert_eq!(evaluate(&ModelFacade::new(&model), &context_for("5B")), vec![]);
    }

    #[rstest]
    fn computer_room_systems_are_exempt() {
        let model = ingest_model(
            json!({
                "Building": {"Name": "Office", "FloorAreaM2": 500.0, "Stories": 1},
                "ThermalZones": {"Core_ZN": {"FloorAreaM2": 500.0}},
                "AirSystems": {
                    "Core_ZN ZN PSZ-AC (Sys3)": {
                        "Zones": ["Core_ZN"],
                        "ServesComputerRooms": true,
                        "OutdoorAirSystem": {"EconomizerControlType": "NoEconomizer"}
                    }
                }
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();
        assert_eq!(evaluate(&ModelFacade::new(&model), &context_for("5B")), vec![]);
    }
}
