//! Baseline ventilation must match the proposed design (G3.1.2.5): zone
//! outdoor-air requirements carry over unchanged.

use crate::core::access::ModelFacade;
use crate::core::compare::{check_value, Tolerance};
use crate::report::{Failure, RuleId};

const RULE: RuleId = RuleId::Ventilation;
const FLOW_TOLERANCE_M3_PER_S: f64 = 1e-4;

pub fn evaluate(baseline: &ModelFacade, proposed: Option<&ModelFacade>) -> Vec<Failure> {
    let Some(proposed) = proposed else {
        tracing::debug!("no proposed model in scenario; skipping ventilation comparison");
        return Vec::new();
    };
    let mut failures = Vec::new();
    for (zone_name, proposed_zone) in proposed.thermal_zones() {
        let Some(proposed_oa) = proposed_zone.minimum_outdoor_air_flow_m3_per_s else {
            continue;
        };
        let Some(baseline_zone) = baseline.zone(zone_name) else {
            failures.push(Failure::missing_object(
                RULE,
                zone_name,
                "a matching baseline zone",
            ));
            continue;
        };
        match baseline_zone.minimum_outdoor_air_flow_m3_per_s {
            None => failures.push(Failure::missing_object(
                RULE,
                zone_name,
                "a baseline outdoor-air requirement",
            )),
            Some(baseline_oa) => failures.extend(check_value(
                RULE,
                zone_name,
                "outdoor air flow",
                proposed_oa,
                baseline_oa,
                Some("m3/s"),
                Tolerance::Absolute(FLOW_TOLERANCE_M3_PER_S),
            )),
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ingest_model, BuildingModel};
    use crate::report::FailureKind;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    fn model(zones: serde_json::Value) -> BuildingModel {
        ingest_model(
            json!({
                "Building": {"Name": "b", "FloorAreaM2": 100.0, "Stories": 1},
                "ThermalZones": zones,
                "AirSystems": {}
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    #[rstest]
    fn matching_rates_pass_and_absent_proposed_model_skips() {
        let baseline = model(json!({
            "Zone 1": {"FloorAreaM2": 100.0, "MinimumOutdoorAirFlowM3PerS": 0.12345}
        }));
        let proposed = model(json!({
            "Zone 1": {"FloorAreaM2": 100.0, "MinimumOutdoorAirFlowM3PerS": 0.12340}
        }));
        let baseline_facade = ModelFacade::new(&baseline);
        assert_eq!(
            evaluate(&baseline_facade, Some(&ModelFacade::new(&proposed))),
            vec![]
        );
        assert_eq!(evaluate(&baseline_facade, None), vec![]);
    }

    #[rstest]
    fn diverging_rate_and_dropped_zone_are_reported() {
        let baseline = model(json!({
            "Zone 1": {"FloorAreaM2": 100.0, "MinimumOutdoorAirFlowM3PerS": 0.15}
        }));
        let proposed = model(json!({
            "Zone 1": {"FloorAreaM2": 100.0, "MinimumOutdoorAirFlowM3PerS": 0.12},
            "Zone 2": {"FloorAreaM2": 50.0, "MinimumOutdoorAirFlowM3PerS": 0.05}
        }));
        let failures = evaluate(&ModelFacade::new(&baseline), Some(&ModelFacade::new(&proposed)));
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].kind, FailureKind::ValueMismatch);
        assert_eq!(failures[1].kind, FailureKind::MissingObject);
        assert_eq!(failures[1].object, "Zone 2");
    }
}
