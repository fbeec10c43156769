//! Condenser-water design temperatures (G3.1.3.11): approach as a function of
//! the site's evaporation design wet-bulb, and the setpoint limits derived
//! from it. All temperatures in °F, differences in °R.

pub const DEFAULT_DESIGN_WET_BULB_F: f64 = 78.;
pub const MINIMUM_SETPOINT_F: f64 = 70.;
/// Tower design entering wet-bulb never goes below this.
pub const TOWER_MINIMUM_DESIGN_WET_BULB_F: f64 = 68.;
pub const TOWER_DESIGN_RANGE_R: f64 = 10.;

const WET_BULB_LOW_LIMIT_F: f64 = 55.;
const WET_BULB_HIGH_LIMIT_F: f64 = 80.;

/// The approach formula is only valid between 55°F and 80°F wet-bulb; design
/// values outside that band are pinned to it.
pub fn clamp_design_wet_bulb(wet_bulb_f: f64) -> f64 {
    wet_bulb_f.clamp(WET_BULB_LOW_LIMIT_F, WET_BULB_HIGH_LIMIT_F)
}

pub fn design_approach_r(wet_bulb_f: f64) -> f64 {
    25.72 - 0.24 * wet_bulb_f
}

/// Leaving-water setpoint at design: wet-bulb plus approach, never below the
/// 70°F floor.
pub fn maximum_setpoint_f(wet_bulb_f: f64) -> f64 {
    (wet_bulb_f + design_approach_r(wet_bulb_f)).max(MINIMUM_SETPOINT_F)
}

pub fn tower_design_wet_bulb_f(wet_bulb_f: f64) -> f64 {
    wet_bulb_f.max(TOWER_MINIMUM_DESIGN_WET_BULB_F)
}
