//! NEMA premium-efficiency motor table, four-pole enclosed, as a step
//! function of brake horsepower.

const MOTOR_EFFICIENCY_STEPS: [(f64, f64); 19] = [
    (150., 0.962),
    (125., 0.958),
    (100., 0.954),
    (75., 0.954),
    (60., 0.954),
    (50., 0.950),
    (40., 0.945),
    (30., 0.941),
    (25., 0.936),
    (20., 0.936),
    (15., 0.930),
    (10., 0.924),
    (7.5, 0.917),
    (5., 0.917),
    (3., 0.895),
    (2., 0.895),
    (1.5, 0.865),
    (1., 0.865),
    (1. / 12., 0.855),
];

/// Fractional-horsepower motors below 1/12 hp fall back to a flat 70%.
pub fn motor_efficiency(brake_horsepower: f64) -> f64 {
    for (step_hp, efficiency) in MOTOR_EFFICIENCY_STEPS {
        if brake_horsepower > step_hp {
            return efficiency;
        }
    }
    0.70
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    #[case(200., 0.962)]
    #[case(150., 0.958)]
    #[case(55., 0.950)]
    #[case(50., 0.945)]
    #[case(12., 0.924)]
    #[case(5.04, 0.917)]
    #[case(4., 0.895)]
    #[case(1.2, 0.865)]
    #[case(0.5, 0.855)]
    #[case(0.05, 0.70)]
    fn efficiency_steps_are_exclusive_on_the_lower_bound(
        #[case] bhp: f64,
        #[case] efficiency: f64,
    ) {
        assert_relative_eq!(motor_efficiency(bhp), efficiency);
    }

    #[rstest]
    fn efficiency_is_monotonic_in_horsepower() {
        let mut previous = 0.;
        for bhp in [0.05, 0.1, 1.1, 1.6, 2.5, 4., 6., 8., 12., 18., 22., 28., 35., 45., 55., 70., 90., 110., 130., 160.] {
            let efficiency = motor_efficiency(bhp);
            assert!(efficiency >= previous, "dip at {bhp} bhp");
            previous = efficiency;
        }
    }
}
