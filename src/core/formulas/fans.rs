//! Baseline fan-power allowances (G3.1.2.9) and the conversion from the
//! model's pressure-rise/efficiency pair back to W/cfm.

use super::motors::motor_efficiency;
use crate::core::units::{PASCALS_PER_INCH_OF_WATER, WATTS_PER_HORSEPOWER};

/// bhp allowance per cfm of supply air, before the pressure-drop adjustment.
pub const CONSTANT_VOLUME_BHP_PER_CFM: f64 = 0.000_94;
pub const VARIABLE_VOLUME_BHP_PER_CFM: f64 = 0.001_3;

/// Pressure-drop adjustment divisor, cfm·in.w.g. per bhp.
pub const PRESSURE_ADJUSTMENT_DIVISOR: f64 = 4_131.;

/// Part-load power coefficients for a variable-speed-drive fan, first to fifth.
pub const VSD_FAN_POWER_COEFFICIENTS: [f64; 5] = [0.0013, 0.1470, 0.9506, -0.0998, 0.];

/// Fixed W/cfm allowances for zone-level fans.
pub const PFP_TERMINAL_FAN_WATTS_PER_CFM: f64 = 0.35;
pub const PACKAGED_TERMINAL_FAN_WATTS_PER_CFM: f64 = 0.30;
pub const UNIT_HEATER_FAN_WATTS_PER_CFM: f64 = 0.30;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FanAllowance {
    ConstantVolume,
    VariableVolume,
}

/// Allowed brake horsepower for a system fan moving `flow_cfm` against the
/// deductible pressure drop `pressure_drop_in_h2o`.
pub fn fan_brake_horsepower(
    flow_cfm: f64,
    pressure_drop_in_h2o: f64,
    allowance: FanAllowance,
) -> f64 {
    let per_cfm = match allowance {
        FanAllowance::ConstantVolume => CONSTANT_VOLUME_BHP_PER_CFM,
        FanAllowance::VariableVolume => VARIABLE_VOLUME_BHP_PER_CFM,
    };
    per_cfm * flow_cfm + pressure_drop_in_h2o * flow_cfm / PRESSURE_ADJUSTMENT_DIVISOR
}

/// Allowed fan electric power per cfm: bhp allowance through a minimum-
/// efficiency motor.
pub fn expected_fan_watts_per_cfm(
    flow_cfm: f64,
    pressure_drop_in_h2o: f64,
    allowance: FanAllowance,
) -> f64 {
    let bhp = fan_brake_horsepower(flow_cfm, pressure_drop_in_h2o, allowance);
    bhp * WATTS_PER_HORSEPOWER / motor_efficiency(bhp) / flow_cfm
}

/// What the model's fan actually draws per cfm, recovered from its pressure
/// rise and total efficiency.
pub fn actual_fan_watts_per_cfm(pressure_rise_pa: f64, total_efficiency: f64) -> f64 {
    (pressure_rise_pa / PASCALS_PER_INCH_OF_WATER) / (8.5605 * total_efficiency)
}
