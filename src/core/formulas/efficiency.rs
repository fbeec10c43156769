//! Minimum-efficiency ratings for unitary equipment and their conversion to
//! the COP values the model actually stores. Capacity arguments are Btu/h
//! unless named otherwise.

const BTU_PER_KBTU: f64 = 1_000.;

/// How the minimum-efficiency tables express a cooling rating below/above the
/// 65 kBtu/h split.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CoolingRating {
    Seer(f64),
    Eer(f64),
}

/// Minimum cooling efficiency for packaged air-cooled DX equipment by rated
/// capacity (electric heat / no heat column).
pub fn baseline_cooling_rating(capacity_btu_per_hour: f64) -> CoolingRating {
    match capacity_btu_per_hour {
        c if c < 65_000. => CoolingRating::Seer(14.0),
        c if c < 135_000. => CoolingRating::Eer(11.0),
        c if c < 240_000. => CoolingRating::Eer(10.8),
        c if c < 760_000. => CoolingRating::Eer(9.8),
        _ => CoolingRating::Eer(9.5),
    }
}

pub fn seer_to_eer(seer: f64) -> f64 {
    -0.0182 * seer * seer + 1.1088 * seer
}

/// Strips the assumed 12% supply-fan allowance out of an EER rating.
pub fn eer_to_cop_no_fan(eer: f64) -> f64 {
    (eer / 3.413 + 0.12) / (1. - 0.12)
}

/// Minimum cooling COP (fan power removed) by rated capacity, combining the
/// table rating with the applicable conversion.
pub fn baseline_cooling_cop(capacity_btu_per_hour: f64) -> f64 {
    match baseline_cooling_rating(capacity_btu_per_hour) {
        CoolingRating::Seer(seer) => eer_to_cop_no_fan(seer_to_eer(seer)),
        CoolingRating::Eer(eer) => eer_to_cop_no_fan(eer),
    }
}

/// Capacity-dependent EER-to-COP form used for coils whose rating is checked
/// at full load rather than through the fan-allowance form.
pub fn eer_to_cop_full_load(eer: f64, capacity_btu_per_hour: f64) -> f64 {
    7.84e-8 * eer * capacity_btu_per_hour + 0.338 * eer
}

/// Capacity-dependent COP47-to-COP form for single-speed DX heating.
pub fn cop47_to_cop(cop_47: f64, capacity_btu_per_hour: f64) -> f64 {
    1.48e-7 * cop_47 * capacity_btu_per_hour + 1.062 * cop_47
}

pub fn hspf_to_cop(hspf: f64) -> f64 {
    -0.0296 * hspf * hspf + 0.7134 * hspf
}

/// Minimum heating COP for air-source heat pumps by rated capacity. Below the
/// 65 kBtu/h split the rating is an HSPF; above, a COP at 47°F.
pub fn baseline_heating_cop(capacity_btu_per_hour: f64) -> f64 {
    match capacity_btu_per_hour {
        c if c < 65_000. => hspf_to_cop(8.0),
        c if c < 135_000. => cop47_to_cop(3.3, c),
        c => cop47_to_cop(3.2, c),
    }
}

/// PTAC/PTHP cooling EER varies linearly with capacity, clamped to the
/// 7-15 kBtu/h band the table covers.
pub fn ptac_cooling_eer(capacity_btu_per_hour: f64) -> f64 {
    13.8 - 0.3 * clamp_ptac_capacity_kbtu(capacity_btu_per_hour)
}

pub fn pthp_heating_cop(capacity_btu_per_hour: f64) -> f64 {
    3.7 - 0.052 * clamp_ptac_capacity_kbtu(capacity_btu_per_hour)
}

fn clamp_ptac_capacity_kbtu(capacity_btu_per_hour: f64) -> f64 {
    (capacity_btu_per_hour / BTU_PER_KBTU).clamp(7., 15.)
}

/// Minimum burner efficiency for gas-fired heating coils (warm-air furnace
/// rows, thermal-efficiency path above 225 kBtu/h).
pub fn gas_coil_burner_efficiency(capacity_btu_per_hour: f64) -> f64 {
    if capacity_btu_per_hour < 225_000. {
        0.80
    } else {
        0.793
    }
}

/// Minimum thermal efficiency for gas-fired hot-water boilers.
pub fn boiler_thermal_efficiency(capacity_btu_per_hour: f64) -> f64 {
    if capacity_btu_per_hour < 300_000. {
        0.80
    } else {
        0.75
    }
}
