//! Primary/secondary chilled-water arrangement: when the baseline carries a
//! primary loop, both chillers live on it, a heat exchanger bridges its demand
//! side to a chiller-free secondary loop, and the secondary serves the coils.

use crate::core::access::ModelFacade;
use crate::input::{PlantComponent, PlantLoopType};
use crate::report::{Failure, RuleId};
use crate::scenario::ScenarioContext;

const RULE: RuleId = RuleId::Topology;

const PRIMARY_LOOP_MARKER: &str = "Chilled Water Loop_Primary";

const PRIMARY_LOOP_CHILLER_COUNT: usize = 2;

pub fn evaluate(facade: &ModelFacade, _context: &ScenarioContext) -> Vec<Failure> {
    let Some((primary_name, primary)) = facade
        .hvac_loops_of_type(PlantLoopType::Cooling)
        .find(|(name, _)| name.contains(PRIMARY_LOOP_MARKER))
    else {
        tracing::debug!("no primary chilled-water loop; skipping topology checks");
        return Vec::new();
    };
    let mut failures = Vec::new();
    let chiller_count = facade.chillers_on(primary).len();
    if chiller_count != PRIMARY_LOOP_CHILLER_COUNT {
        failures.push(Failure::value_mismatch(
            RULE,
            primary_name,
            "chiller count on the primary loop",
            PRIMARY_LOOP_CHILLER_COUNT,
            chiller_count,
            None,
        ));
    }
    if !has_heat_exchanger(&primary.demand_components) {
        failures.push(Failure::missing_object(
            RULE,
            primary_name,
            "a heat exchanger on the primary loop's demand side",
        ));
    }
    let mut secondary_found = false;
    for (name, plant_loop) in facade.hvac_loops_of_type(PlantLoopType::Cooling) {
        if name == primary_name {
            continue;
        }
        if has_heat_exchanger(&plant_loop.supply_components) {
            secondary_found = true;
            for chiller in facade.chillers_on(plant_loop) {
                failures.push(Failure::unexpected_object(
                    RULE,
                    name,
                    format!("chiller {} on the secondary loop", chiller.name()),
                ));
            }
        }
    }
    if !secondary_found {
        failures.push(Failure::missing_object(
            RULE,
            primary_name,
            "a secondary loop supplied through a heat exchanger",
        ));
    }
    failures
}

fn has_heat_exchanger(components: &[PlantComponent]) -> bool {
    components
        .iter()
        .any(|c| matches!(c, PlantComponent::HeatExchanger { .. }))
}
