//! The baseline HVAC system type (G3.1.1 / Table G3.1.1-3): the selection
//! table picks one type from climate, residential use, stories and floor
//! area, and the model's dominant system must match it.

use crate::core::access::ModelFacade;
use crate::core::compare::check_token;
use crate::core::system_type::{expected_baseline_system_type, BaselineSystemType, SelectionInputs};
use crate::report::{Failure, RuleId};
use crate::scenario::ScenarioContext;
use itertools::Itertools;

const RULE: RuleId = RuleId::SystemType;

pub fn evaluate(facade: &ModelFacade, context: &ScenarioContext) -> Vec<Failure> {
    let mut failures = Vec::new();
    for (name, system) in facade.air_systems() {
        let classification = facade.classify_system(name, system);
        if classification.conflicting() {
            failures.push(Failure::ambiguous_model(
                RULE,
                name,
                "tagged system type disagrees with the name convention",
            ));
        }
    }
    let building = facade
        .model()
        .building
        .name
        .as_deref()
        .unwrap_or("building");
    let (Some(stories), Some(floor_area_ft2)) =
        (facade.building_stories(), facade.building_floor_area_ft2())
    else {
        failures.push(Failure::missing_object(
            RULE,
            building,
            "a story count and floor area on the building",
        ));
        return failures;
    };
    let expected = expected_baseline_system_type(&SelectionInputs {
        climate_zone: &context.climate_zone,
        residential: context.residential(),
        stories,
        floor_area_ft2,
    });
    // PSZ-VAV systems are the carve-out for computer rooms and the like;
    // they never represent the building's predominant type
    let Some(actual) = dominant_system_type(facade) else {
        failures.push(Failure::missing_object(
            RULE,
            building,
            "at least one classifiable air system",
        ));
        return failures;
    };
    failures.extend(check_token(
        RULE,
        building,
        "baseline system type",
        &expected.to_string(),
        &actual.to_string(),
    ));
    failures
}

/// Most frequent resolved type across the model's air systems; on a tie the
/// first-seen type wins, matching model ingest order.
fn dominant_system_type(facade: &ModelFacade) -> Option<BaselineSystemType> {
    let ordered: Vec<BaselineSystemType> = facade
        .air_systems()
        .filter_map(|(name, system)| facade.classify_system(name, system).resolved())
        .filter(|t| *t != BaselineSystemType::PszVav)
        .collect();
    let counts = ordered.iter().counts();
    let mut dominant: Option<(BaselineSystemType, usize)> = None;
    for system_type in &ordered {
        let count = counts[system_type];
        if dominant.map_or(true, |(_, best)| count > best) {
            dominant = Some((*system_type, count));
        }
    }
    dominant.map(|(system_type, _)| system_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ingest_model, BuildingModel};
    use crate::report::FailureKind;
    use crate::scenario::{ScenarioContext, ScenarioSpec};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    fn context(building_type: &str, climate_zone: &str) -> ScenarioContext {
        ScenarioContext::new(
            &serde_json::from_value::<ScenarioSpec>(json!({
                "BuildingType": building_type,
                "Template": "90.1-2013",
                "ClimateZone": climate_zone,
                "BaselineModel": "unused.json"
            }))
            .unwrap(),
        )
    }

    fn model(
        floor_area_m2: f64,
        stories: u32,
        air_systems: serde_json::Value,
    ) -> BuildingModel {
        ingest_model(
            json!({
                "Building": {"Name": "b", "FloorAreaM2": floor_area_m2, "Stories": stories},
                "ThermalZones": {},
                "AirSystems": air_systems
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    #[rstest]
    fn small_low_rise_office_matches_psz_ac() {
        // 1,000 m² (10,764 ft²), 2 stories, gas heat in 5B
        let model = model(
            1000.,
            2,
            json!({"Perimeter (Sys3)": {}, "Core (Sys3)": {}}),
        );
        assert_eq!(
            evaluate(&ModelFacade::new(&model), &context("SmallOffice", "5B")),
            vec![]
        );
    }

    #[rstest]
    fn mid_rise_office_modelled_as_psz_is_a_mismatch() {
        // 10,000 m² (107,639 ft²), 5 stories wants PVAV_Reheat
        let model = model(10_000., 5, json!({"Floor 1 (Sys3)": {}}));
        let failures = evaluate(&ModelFacade::new(&model), &context("MediumOffice", "5B"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].expected, "PVAV_Reheat");
        assert_eq!(failures[0].actual, "PSZ-AC");
    }

    #[rstest]
    fn psz_vav_carve_outs_do_not_sway_the_dominant_type() {
        let model = model(
            10_000.,
            5,
            json!({
                "Floor 1 (Sys5)": {},
                "IT Closet PSZ-VAV": {},
                "Server Room PSZ-VAV": {},
                "Floor 2 (Sys5)": {}
            }),
        );
        assert_eq!(
            evaluate(&ModelFacade::new(&model), &context("MediumOffice", "5B")),
            vec![]
        );
    }

    #[rstest]
    fn conflicting_tag_and_name_are_ambiguous() {
        let model = model(
            1000.,
            2,
            json!({"Perimeter (Sys3)": {"BaselineSystemType": "PSZ_HP"}}),
        );
        let failures = evaluate(&ModelFacade::new(&model), &context("SmallOffice", "5B"));
        assert_eq!(failures[0].kind, FailureKind::AmbiguousModel);
        // the tag wins the resolution, and 5B gas heat expects PSZ-AC
        assert!(failures
            .iter()
            .any(|f| f.kind == FailureKind::ValueMismatch && f.actual == "PSZ-HP"));
    }

    #[rstest]
    fn electric_heat_climates_swap_in_heat_pumps() {
        let model = model(1000., 2, json!({"Perimeter (Sys4)": {}}));
        assert_eq!(
            evaluate(&ModelFacade::new(&model), &context("SmallOffice", "1A")),
            vec![]
        );
    }

    #[rstest]
    fn residential_prototype_expects_packaged_terminals() {
        let model = model(3000., 4, json!({"Apartments (Sys1)": {}}));
        assert_eq!(
            evaluate(&ModelFacade::new(&model), &context("MidriseApartment", "5B")),
            vec![]
        );
    }
}
