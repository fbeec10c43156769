//! Baseline pump-power allowances in W/gpm and the part-load curves the
//! standard prescribes for variable-flow pumps.

use crate::core::units::pascals_to_feet_of_water;

/// W/gpm targets by loop and pump role (G3.1.3.5/.10/.11).
pub const CHILLED_WATER_SUPPLY_WATTS_PER_GPM: f64 = 9.;
pub const CHILLED_WATER_DEMAND_WATTS_PER_GPM: f64 = 13.;
pub const DISTRICT_CHILLED_WATER_WATTS_PER_GPM: f64 = 16.;
pub const CONDENSER_WATER_WATTS_PER_GPM: f64 = 19.;
pub const HOT_WATER_WATTS_PER_GPM: f64 = 19.;
pub const DISTRICT_HOT_WATER_WATTS_PER_GPM: f64 = 14.;

/// Fixed impeller efficiency assumed when backing specific power out of a
/// pump's rated head.
pub const IMPELLER_EFFICIENCY: f64 = 0.78;

/// Part-load coefficients, first to fourth, for a pump riding its curve.
pub const RIDING_CURVE_COEFFICIENTS: [f64; 4] = [0., 3.2485, -4.7443, 2.5294];
/// Part-load coefficients for a pump on a variable-speed drive.
pub const VSD_COEFFICIENTS: [f64; 4] = [0., 0.5726, -0.301, 0.7347];

/// Chilled-water plants under this capacity ride the pump curve; plants at
/// or above it get a VSD.
pub const CHILLED_WATER_VSD_THRESHOLD_TONS: f64 = 300.;
/// Hot-water plants serving at least this floor area get a VSD.
pub const HOT_WATER_VSD_THRESHOLD_FT2: f64 = 120_000.;

/// Specific pump power implied by a rated head and motor efficiency,
/// W per gpm.
pub fn pump_watts_per_gpm(rated_head_pa: f64, motor_efficiency: f64) -> f64 {
    pascals_to_feet_of_water(rated_head_pa) / (5.302 * motor_efficiency * IMPELLER_EFFICIENCY)
}

/// Rated head that realises a W/gpm target at a given motor efficiency;
/// the inverse of [`pump_watts_per_gpm`], used when building expectations.
pub fn rated_head_for_watts_per_gpm(watts_per_gpm: f64, motor_efficiency: f64) -> f64 {
    watts_per_gpm * 5.302 * motor_efficiency * IMPELLER_EFFICIENCY * crate::core::units::PASCALS_PER_FOOT_OF_WATER
}
