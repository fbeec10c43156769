//! Conversions between the model's native SI units and the IP units the
//! standard's tables are written in. All conversions are exact linear/offset
//! forms; rules apply them through the facade so tolerances stay in one
//! unit system per check.

pub const BTU_PER_HOUR_PER_WATT: f64 = 3.412141633;
pub const BTU_PER_HOUR_PER_TON: f64 = 12_000.;
pub const WATTS_PER_HORSEPOWER: f64 = 746.;
pub const SQUARE_FEET_PER_SQUARE_METRE: f64 = 10.7639;
pub const CFM_PER_CUBIC_METRE_PER_SECOND: f64 = 2_118.88;
pub const GPM_PER_CUBIC_METRE_PER_SECOND: f64 = 15_850.32314;
pub const PASCALS_PER_INCH_OF_WATER: f64 = 249.1;
// Pump heads are quoted in feet of water; 12 inches at 249.09 Pa/inch.
pub const PASCALS_PER_FOOT_OF_WATER: f64 = 12. * 249.09;
pub const RANKINE_PER_KELVIN: f64 = 1.8;

pub fn celsius_to_fahrenheit(temp_c: f64) -> f64 {
    temp_c * 9. / 5. + 32.
}

pub fn fahrenheit_to_celsius(temp_f: f64) -> f64 {
    (temp_f - 32.) * 5. / 9.
}

/// Temperature *differences* scale without the freezing-point offset.
pub fn delta_kelvin_to_rankine(delta_k: f64) -> f64 {
    delta_k * RANKINE_PER_KELVIN
}

pub fn delta_rankine_to_kelvin(delta_r: f64) -> f64 {
    delta_r / RANKINE_PER_KELVIN
}

pub fn watts_to_btu_per_hour(power_w: f64) -> f64 {
    power_w * BTU_PER_HOUR_PER_WATT
}

pub fn watts_to_tons(power_w: f64) -> f64 {
    watts_to_btu_per_hour(power_w) / BTU_PER_HOUR_PER_TON
}

pub fn square_metres_to_square_feet(area_m2: f64) -> f64 {
    area_m2 * SQUARE_FEET_PER_SQUARE_METRE
}

pub fn cubic_metres_per_second_to_cfm(flow_m3s: f64) -> f64 {
    flow_m3s * CFM_PER_CUBIC_METRE_PER_SECOND
}

pub fn cubic_metres_per_second_to_gpm(flow_m3s: f64) -> f64 {
    flow_m3s * GPM_PER_CUBIC_METRE_PER_SECOND
}

pub fn pascals_to_inches_of_water(pressure_pa: f64) -> f64 {
    pressure_pa / PASCALS_PER_INCH_OF_WATER
}

pub fn pascals_to_feet_of_water(pressure_pa: f64) -> f64 {
    pressure_pa / PASCALS_PER_FOOT_OF_WATER
}
