//! Supply-air temperature rules (G3.1.2.8.1 and G3.1.3.12): zone sizing
//! deltas of 20°F (17°F for laboratory space), the 105°F unit-heater supply
//! temperature, and the 5°F warmest-zone reset on multizone VAV systems.

use crate::core::access::ModelFacade;
use crate::core::compare::{check_value, Tolerance};
use crate::core::units::{delta_kelvin_to_rankine, fahrenheit_to_celsius};
use crate::input::{
    ScheduleSummary, SetpointManager, SizingInputMethod, ThermalZone, ZoneEquipment,
};
use crate::report::{Failure, RuleId};
use crate::scenario::ScenarioContext;

const RULE: RuleId = RuleId::SupplyAirTemp;

const STANDARD_DELTA_T_R: f64 = 20.;
const LABORATORY_DELTA_T_R: f64 = 17.;
const DELTA_TOLERANCE_R: f64 = 0.1;
const UNIT_HEATER_SUPPLY_F: f64 = 105.;
const UNIT_HEATER_TOLERANCE_C: f64 = 0.001;

/// Setpoints outside this band mark plenums and other unconditioned zones
/// whose sizing is not governed by the delta-T rule.
const MIN_HEATING_SETPOINT_F: f64 = 41.;
const MAX_COOLING_SETPOINT_F: f64 = 91.;

const RESET_SPREAD_R: f64 = 5.;
const RESET_TOLERANCE_R: f64 = 0.1;

pub fn evaluate(facade: &ModelFacade, _context: &ScenarioContext) -> Vec<Failure> {
    let mut failures = Vec::new();
    for (zone_name, zone) in facade.thermal_zones() {
        check_zone_sizing(zone_name, zone, &mut failures);
    }
    for (system_name, system) in facade.air_systems() {
        let classification = facade.classify_system(system_name, system);
        if classification.resolved().is_some_and(|t| t.is_multizone_vav()) {
            check_reset(system_name, &system.setpoint_managers, &mut failures);
        }
    }
    failures
}

fn check_zone_sizing(zone_name: &str, zone: &ThermalZone, failures: &mut Vec<Failure>) {
    if zone
        .equipment
        .iter()
        .any(|e| matches!(e, ZoneEquipment::UnitHeater { .. }))
    {
        check_unit_heater_zone(zone_name, zone, failures);
        return;
    }
    let Some(sizing) = zone.sizing else {
        tracing::debug!("skipping {zone_name}: no sizing record");
        return;
    };
    let delta_t_r = if has_laboratory_space(zone) {
        LABORATORY_DELTA_T_R
    } else {
        STANDARD_DELTA_T_R
    };
    let thermostat = zone.thermostat.as_ref();
    check_side(
        zone_name,
        "cooling",
        delta_t_r,
        sizing.cooling_input_method,
        sizing.cooling_design_temperature_difference_k,
        sizing.cooling_design_supply_air_temperature_c,
        thermostat.and_then(|t| t.cooling_setpoint_schedule),
        failures,
    );
    check_side(
        zone_name,
        "heating",
        delta_t_r,
        sizing.heating_input_method,
        sizing.heating_design_temperature_difference_k,
        sizing.heating_design_supply_air_temperature_c,
        thermostat.and_then(|t| t.heating_setpoint_schedule),
        failures,
    );
}

/// One side (heating or cooling) of a zone's sizing record. The delta is
/// taken directly when the zone sizes on a temperature difference, and
/// reconstructed from the thermostat setpoint when it sizes on an absolute
/// supply temperature.
#[allow(clippy::too_many_arguments)]
fn check_side(
    zone_name: &str,
    side: &str,
    delta_t_r: f64,
    method: Option<SizingInputMethod>,
    difference_k: Option<f64>,
    supply_temperature_c: Option<f64>,
    setpoint_schedule: Option<ScheduleSummary>,
    failures: &mut Vec<Failure>,
) {
    match method {
        Some(SizingInputMethod::SupplyAirTemperatureDifference) => {
            let Some(difference_k) = difference_k else {
                failures.push(Failure::missing_object(
                    RULE,
                    zone_name,
                    format!("a {side} design temperature difference"),
                ));
                return;
            };
            failures.extend(check_value(
                RULE,
                zone_name,
                &format!("{side} sizing delta-T"),
                delta_t_r,
                delta_kelvin_to_rankine(difference_k),
                Some("R"),
                Tolerance::Absolute(DELTA_TOLERANCE_R),
            ));
        }
        Some(SizingInputMethod::SupplyAirTemperature) => {
            let Some(supply_c) = supply_temperature_c else {
                failures.push(Failure::missing_object(
                    RULE,
                    zone_name,
                    format!("a {side} design supply air temperature"),
                ));
                return;
            };
            let Some(setpoint_c) = setpoint_for(side, setpoint_schedule) else {
                tracing::debug!("skipping {zone_name} {side}: no thermostat setpoint");
                return;
            };
            if outside_conditioned_band(side, setpoint_c) {
                tracing::debug!("skipping {zone_name} {side}: setpoint marks an unconditioned zone");
                return;
            }
            // supply below setpoint when cooling, above when heating
            let delta_k = if side == "cooling" {
                setpoint_c - supply_c
            } else {
                supply_c - setpoint_c
            };
            failures.extend(check_value(
                RULE,
                zone_name,
                &format!("{side} sizing delta-T"),
                delta_t_r,
                delta_kelvin_to_rankine(delta_k),
                Some("R"),
                Tolerance::Absolute(DELTA_TOLERANCE_R),
            ));
        }
        None => {
            tracing::debug!("skipping {zone_name} {side}: no sizing input method");
        }
    }
}

/// The governing setpoint at design: the occupied cooling minimum or the
/// occupied heating maximum.
fn setpoint_for(side: &str, schedule: Option<ScheduleSummary>) -> Option<f64> {
    schedule.map(|s| if side == "cooling" { s.min_value } else { s.max_value })
}

fn outside_conditioned_band(side: &str, setpoint_c: f64) -> bool {
    if side == "cooling" {
        setpoint_c > fahrenheit_to_celsius(MAX_COOLING_SETPOINT_F)
    } else {
        setpoint_c < fahrenheit_to_celsius(MIN_HEATING_SETPOINT_F)
    }
}

fn check_unit_heater_zone(zone_name: &str, zone: &ThermalZone, failures: &mut Vec<Failure>) {
    let Some(supply_c) = zone
        .sizing
        .and_then(|s| s.heating_design_supply_air_temperature_c)
    else {
        failures.push(Failure::missing_object(
            RULE,
            zone_name,
            "a heating design supply air temperature on the unit-heater zone",
        ));
        return;
    };
    failures.extend(check_value(
        RULE,
        zone_name,
        "unit-heater heating supply temperature",
        fahrenheit_to_celsius(UNIT_HEATER_SUPPLY_F),
        supply_c,
        Some("C"),
        Tolerance::Absolute(UNIT_HEATER_TOLERANCE_C),
    ));
}

fn has_laboratory_space(zone: &ThermalZone) -> bool {
    zone.spaces.iter().any(|space| {
        space
            .standards_space_type
            .as_deref()
            .is_some_and(|t| t.to_ascii_lowercase().contains("laboratory"))
    })
}

/// Multizone VAV systems reset supply-air temperature by warmest zone over a
/// 5°F band; exactly one setpoint manager belongs on the supply outlet node.
fn check_reset(
    system_name: &str,
    setpoint_managers: &[SetpointManager],
    failures: &mut Vec<Failure>,
) {
    match setpoint_managers {
        [] => failures.push(Failure::missing_object(
            RULE,
            system_name,
            "a warmest-zone supply-air-temperature reset setpoint manager",
        )),
        [SetpointManager::Warmest {
            minimum_setpoint_temperature_c,
            maximum_setpoint_temperature_c,
            ..
        }] => {
            let spread_k = maximum_setpoint_temperature_c - minimum_setpoint_temperature_c;
            failures.extend(check_value(
                RULE,
                system_name,
                "supply-air-temperature reset range",
                RESET_SPREAD_R,
                delta_kelvin_to_rankine(spread_k),
                Some("R"),
                Tolerance::Absolute(RESET_TOLERANCE_R),
            ));
        }
        [other] => failures.push(Failure::value_mismatch(
            RULE,
            system_name,
            "setpoint manager type",
            "'Warmest'",
            format!("'{}'", other.type_name()),
            None,
        )),
        many => failures.push(Failure::ambiguous_model(
            RULE,
            system_name,
            format!("{} setpoint managers on the supply outlet node", many.len()),
        )),
    }
}
