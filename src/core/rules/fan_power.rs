//! Baseline fan power (G3.1.2.9/.10): system supply fans against the bhp
//! allowance, VSD part-load coefficients on multizone variable-volume fans,
//! and the fixed W/cfm allowances for zone-level fans.

use crate::core::access::ModelFacade;
use crate::core::compare::{check_value, Tolerance};
use crate::core::formulas::fans::{
    actual_fan_watts_per_cfm, expected_fan_watts_per_cfm, FanAllowance,
    PACKAGED_TERMINAL_FAN_WATTS_PER_CFM, PFP_TERMINAL_FAN_WATTS_PER_CFM,
    UNIT_HEATER_FAN_WATTS_PER_CFM, VSD_FAN_POWER_COEFFICIENTS,
};
use crate::core::units::pascals_to_inches_of_water;
use crate::input::{AirSystem, Fan, FanVolumeControl, ZoneEquipment};
use crate::report::{Failure, RuleId};
use crate::scenario::ScenarioContext;

const RULE: RuleId = RuleId::FanPower;

const VARIABLE_VOLUME_TOLERANCE: f64 = 0.02;
const CONSTANT_VOLUME_TOLERANCE: f64 = 0.01;
const PFP_TOLERANCE: f64 = 0.02;
const ZONE_FAN_TOLERANCE: f64 = 0.01;
const COEFFICIENT_TOLERANCE: f64 = 0.01;

pub fn evaluate(facade: &ModelFacade, _context: &ScenarioContext) -> Vec<Failure> {
    let mut failures = Vec::new();
    for (system_name, system) in facade.air_systems() {
        let Some(fan) = system.supply_fan.as_ref() else {
            tracing::debug!("skipping {system_name}: no supply fan");
            continue;
        };
        check_system_fan(facade, system, fan, &mut failures);
    }
    for (_, zone) in facade.thermal_zones() {
        for equipment in &zone.equipment {
            check_zone_fan(equipment, &mut failures);
        }
    }
    failures
}

fn check_system_fan(
    facade: &ModelFacade,
    system: &AirSystem,
    fan: &Fan,
    failures: &mut Vec<Failure>,
) {
    let Some(flow_cfm) = facade.fan_design_flow_cfm(fan, system) else {
        failures.push(Failure::missing_object(
            RULE,
            &fan.name,
            "a design supply air flow",
        ));
        return;
    };
    let (Some(pressure_rise_pa), Some(total_efficiency)) =
        (fan.pressure_rise_pa, fan.total_efficiency)
    else {
        failures.push(Failure::missing_object(
            RULE,
            &fan.name,
            "a pressure rise and total efficiency",
        ));
        return;
    };
    let variable = fan.volume_control == FanVolumeControl::VariableVolume;
    let allowance = if variable {
        FanAllowance::VariableVolume
    } else {
        FanAllowance::ConstantVolume
    };
    let pressure_drop_in_h2o = pascals_to_inches_of_water(pressure_rise_pa);
    let expected = expected_fan_watts_per_cfm(flow_cfm, pressure_drop_in_h2o, allowance);
    let actual = actual_fan_watts_per_cfm(pressure_rise_pa, total_efficiency);
    let tolerance = if variable {
        VARIABLE_VOLUME_TOLERANCE
    } else {
        CONSTANT_VOLUME_TOLERANCE
    };
    failures.extend(check_value(
        RULE,
        &fan.name,
        "fan power",
        expected,
        actual,
        Some("W/cfm"),
        Tolerance::Absolute(tolerance),
    ));
    // single-zone variable-volume systems modulate for ventilation, not duct
    // static, so the VSD curve does not apply to them
    if variable && system.zones.len() > 1 {
        check_vsd_coefficients(fan, failures);
    }
}

fn check_vsd_coefficients(fan: &Fan, failures: &mut Vec<Failure>) {
    let Some(coefficients) = fan.power_coefficients.as_ref() else {
        failures.push(Failure::missing_object(
            RULE,
            &fan.name,
            "variable-speed fan power coefficients",
        ));
        return;
    };
    for (index, expected) in VSD_FAN_POWER_COEFFICIENTS.iter().enumerate() {
        let actual = coefficients.get(index).copied().unwrap_or_default();
        let tolerance = if *expected == 0. {
            Tolerance::Absolute(COEFFICIENT_TOLERANCE)
        } else {
            Tolerance::Relative(COEFFICIENT_TOLERANCE)
        };
        failures.extend(check_value(
            RULE,
            format!("{} coefficient {}", fan.name, index + 1),
            "power coefficient",
            *expected,
            actual,
            None,
            tolerance,
        ));
    }
}

fn check_zone_fan(equipment: &ZoneEquipment, failures: &mut Vec<Failure>) {
    let (fan, target, tolerance) = match equipment {
        ZoneEquipment::ParallelPiuTerminal { fan: Some(fan), .. } => {
            (fan, PFP_TERMINAL_FAN_WATTS_PER_CFM, PFP_TOLERANCE)
        }
        ZoneEquipment::Ptac { fan: Some(fan), .. } | ZoneEquipment::Pthp { fan: Some(fan), .. } => {
            (fan, PACKAGED_TERMINAL_FAN_WATTS_PER_CFM, ZONE_FAN_TOLERANCE)
        }
        ZoneEquipment::UnitHeater { fan: Some(fan), .. } => {
            (fan, UNIT_HEATER_FAN_WATTS_PER_CFM, ZONE_FAN_TOLERANCE)
        }
        _ => return,
    };
    let (Some(pressure_rise_pa), Some(total_efficiency)) =
        (fan.pressure_rise_pa, fan.total_efficiency)
    else {
        failures.push(Failure::missing_object(
            RULE,
            &fan.name,
            "a pressure rise and total efficiency",
        ));
        return;
    };
    failures.extend(check_value(
        RULE,
        &fan.name,
        "fan power",
        target,
        actual_fan_watts_per_cfm(pressure_rise_pa, total_efficiency),
        Some("W/cfm"),
        Tolerance::Absolute(tolerance),
    ));
}
