//! Prescribed boiler/chiller/tower counts and the chiller efficiency path by
//! plant capacity (G3.1.3.2/.7/.11).

use crate::core::units::BTU_PER_HOUR_PER_WATT;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressorType {
    PositiveDisplacement,
    Centrifugal,
}

/// Buildings over 15,000 ft² of heated floor area get two equally sized
/// boilers; smaller ones get one.
pub const BOILER_AREA_THRESHOLD_FT2: f64 = 15_000.;

pub fn expected_boiler_count(served_floor_area_ft2: f64) -> usize {
    if served_floor_area_ft2 > BOILER_AREA_THRESHOLD_FT2 {
        2
    } else {
        1
    }
}

/// Chiller count and compressor type by total plant cooling load. Plants at
/// 600 tons and above split into centrifugal machines of at most 800 tons
/// each, never fewer than two.
pub fn expected_chiller_plant(total_tons: f64) -> (usize, CompressorType) {
    if total_tons <= 300. {
        (1, CompressorType::PositiveDisplacement)
    } else if total_tons < 600. {
        (2, CompressorType::PositiveDisplacement)
    } else {
        let count = ((total_tons / 800.).floor() as usize + 1).max(2);
        (count, CompressorType::Centrifugal)
    }
}

/// One tower serves the whole condenser loop regardless of chiller count.
pub fn expected_cooling_tower_count() -> usize {
    1
}

/// Path A full-load kW/ton by per-chiller capacity. Water-cooled positive
/// displacement and centrifugal rows coincide at the sizes the baseline
/// produces.
pub fn path_a_kw_per_ton(tons_per_chiller: f64) -> f64 {
    match tons_per_chiller {
        t if t >= 600. => 0.560,
        t if t >= 300. => 0.610,
        t if t >= 150. => 0.660,
        t if t >= 75. => 0.720,
        _ => 0.750,
    }
}

pub fn kw_per_ton_to_cop(kw_per_ton: f64) -> f64 {
    (12. / kw_per_ton) / BTU_PER_HOUR_PER_WATT
}

/// Prescribed sizing factors on the baseline plant loops.
pub const COOLING_SIZING_FACTOR: f64 = 1.15;
pub const HEATING_SIZING_FACTOR: f64 = 1.25;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    #[case(14_999., 1)]
    #[case(15_000., 1)]
    #[case(15_001., 2)]
    #[case(120_000., 2)]
    fn boiler_count_steps_just_above_threshold(#[case] area_ft2: f64, #[case] count: usize) {
        assert_eq!(expected_boiler_count(area_ft2), count);
    }

    #[rstest]
    #[case(120., 1, CompressorType::PositiveDisplacement)]
    #[case(300., 1, CompressorType::PositiveDisplacement)]
    #[case(300.01, 2, CompressorType::PositiveDisplacement)]
    #[case(599.99, 2, CompressorType::PositiveDisplacement)]
    #[case(600., 2, CompressorType::Centrifugal)]
    #[case(1_650., 3, CompressorType::Centrifugal)]
    #[case(2_400., 4, CompressorType::Centrifugal)]
    fn chiller_plant_boundaries(
        #[case] tons: f64,
        #[case] count: usize,
        #[case] compressor: CompressorType,
    ) {
        assert_eq!(expected_chiller_plant(tons), (count, compressor));
    }

    #[rstest]
    #[case(700., 0.560)]
    #[case(600., 0.560)]
    #[case(450., 0.610)]
    #[case(299., 0.660)]
    #[case(100., 0.720)]
    #[case(50., 0.750)]
    fn path_a_table_by_per_chiller_capacity(#[case] tons: f64, #[case] kw_per_ton: f64) {
        assert_relative_eq!(path_a_kw_per_ton(tons), kw_per_ton);
    }

    #[rstest]
    fn kw_per_ton_converts_to_cop() {
        assert_relative_eq!(
            kw_per_ton_to_cop(0.560),
            (12. / 0.560) / 3.412141633,
            max_relative = 1e-12
        );
    }
}
