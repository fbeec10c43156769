//! VAV terminal minimum flow setpoints (G3.1.3.13): the larger of 30% of the
//! terminal's design flow and the zone's minimum outdoor-air requirement.

use crate::core::access::ModelFacade;
use crate::core::compare::{check_value, Tolerance};
use crate::input::{ThermalZone, ZoneEquipment};
use crate::report::{Failure, RuleId};
use crate::scenario::ScenarioContext;

const RULE: RuleId = RuleId::VavMinFlow;
const MINIMUM_FRACTION_FLOOR: f64 = 0.3;
const FRACTION_TOLERANCE: f64 = 0.01;

pub fn evaluate(facade: &ModelFacade, _context: &ScenarioContext) -> Vec<Failure> {
    let mut failures = Vec::new();
    for (system_name, system) in facade.air_systems() {
        for zone_name in &system.zones {
            let Some(zone) = facade.zone(zone_name) else {
                failures.push(Failure::missing_object(
                    RULE,
                    system_name,
                    format!("served zone '{zone_name}'"),
                ));
                continue;
            };
            for equipment in &zone.equipment {
                check_terminal(zone, equipment, &mut failures);
            }
        }
    }
    failures
}

fn check_terminal(zone: &ThermalZone, equipment: &ZoneEquipment, failures: &mut Vec<Failure>) {
    let (name, design_flow, actual_fraction) = match equipment {
        ZoneEquipment::VavReheatTerminal {
            name,
            maximum_air_flow_m3_per_s,
            autosized_maximum_air_flow_m3_per_s,
            constant_minimum_air_flow_fraction,
            ..
        } => (
            name,
            maximum_air_flow_m3_per_s.or(*autosized_maximum_air_flow_m3_per_s),
            *constant_minimum_air_flow_fraction,
        ),
        ZoneEquipment::ParallelPiuTerminal {
            name,
            maximum_primary_air_flow_m3_per_s,
            autosized_maximum_primary_air_flow_m3_per_s,
            minimum_primary_air_flow_fraction,
            ..
        } => (
            name,
            maximum_primary_air_flow_m3_per_s.or(*autosized_maximum_primary_air_flow_m3_per_s),
            *minimum_primary_air_flow_fraction,
        ),
        _ => return,
    };
    let Some(design_flow) = design_flow else {
        failures.push(Failure::missing_object(
            RULE,
            name,
            "a design maximum air flow",
        ));
        return;
    };
    let Some(actual) = actual_fraction else {
        failures.push(Failure::missing_object(
            RULE,
            name,
            "a minimum flow fraction",
        ));
        return;
    };
    let outdoor_air_fraction =
        zone.minimum_outdoor_air_flow_m3_per_s.unwrap_or_default() / design_flow;
    let expected = round2(outdoor_air_fraction.max(MINIMUM_FRACTION_FLOOR));
    let quantity = if outdoor_air_fraction > MINIMUM_FRACTION_FLOOR {
        "outdoor-air-driven minimum flow fraction"
    } else {
        "minimum flow fraction"
    };
    failures.extend(check_value(
        RULE,
        name,
        quantity,
        expected,
        actual,
        None,
        Tolerance::Absolute(FRACTION_TOLERANCE),
    ));
}

/// Expectations round to two decimals the way the generator's setter does.
fn round2(value: f64) -> f64 {
    (value * 100.).round() / 100.
}
