//! Scenario specifications and the runner that turns one scenario into a
//! failure report.
//!
//! A suite file names the scenarios to evaluate; each scenario pairs a
//! baseline model (and optionally the proposed model it was derived from)
//! with the prototype/climate metadata the rules key on.

use crate::core::access::ModelFacade;
use crate::core::rules;
use crate::core::system_type::ClimateZone;
use crate::errors::{CheckError, ModelLoadError};
use crate::input::ingest_model;
use crate::report::{FailureReport, RuleId};
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SuiteSpec {
    pub scenarios: Vec<ScenarioSpec>,
}

pub fn ingest_suite(json: impl Read) -> Result<SuiteSpec, anyhow::Error> {
    serde_json::from_reader(BufReader::new(json)).context("Could not parse scenario suite JSON")
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ScenarioSpec {
    pub name: Option<String>,
    /// Prototype building type, e.g. "SmallOffice" or "MidriseApartment".
    pub building_type: String,
    /// Code template the baseline was built to, e.g. "90.1-2013".
    pub template: String,
    /// Climate zone, either bare ("5B") or the full standard reference.
    pub climate_zone: String,
    pub variant: Option<String>,
    /// Paths are resolved relative to the suite file's directory.
    pub baseline_model: PathBuf,
    pub proposed_model: Option<PathBuf>,
    /// Explicit rule selection; all applicable rules when absent.
    pub rules: Option<Vec<RuleId>>,
}

impl ScenarioSpec {
    /// Identifier used in reports and output file names.
    pub fn id(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            format!(
                "{}-{}-{}{}",
                self.building_type,
                self.template,
                self.climate_zone,
                self.variant
                    .as_ref()
                    .map(|v| format!("-{v}"))
                    .unwrap_or_default()
            )
        })
    }
}

/// The per-scenario metadata rules evaluate against.
pub struct ScenarioContext {
    pub scenario_id: String,
    pub building_type: String,
    pub template: String,
    pub climate_zone: ClimateZone,
    pub variant: Option<String>,
}

impl ScenarioContext {
    pub fn new(spec: &ScenarioSpec) -> Self {
        Self {
            scenario_id: spec.id(),
            building_type: spec.building_type.clone(),
            template: spec.template.clone(),
            climate_zone: ClimateZone::parse(&spec.climate_zone),
            variant: spec.variant.clone(),
        }
    }

    /// Whether the prototype counts as residential for the baseline
    /// system-type selection.
    pub fn residential(&self) -> bool {
        matches!(
            self.building_type.as_str(),
            "MidriseApartment" | "HighriseApartment" | "SmallHotel" | "LargeHotel"
        )
    }
}

pub const ALL_RULES: [RuleId; 10] = [
    RuleId::SystemType,
    RuleId::Economizers,
    RuleId::SupplyAirTemp,
    RuleId::VavMinFlow,
    RuleId::Ventilation,
    RuleId::FanPower,
    RuleId::CoilEfficiency,
    RuleId::PlantControls,
    RuleId::PlantEquipment,
    RuleId::Topology,
];

/// Evaluate one scenario whose models are already loaded.
pub fn evaluate_scenario(
    spec: &ScenarioSpec,
    baseline: &ModelFacade,
    proposed: Option<&ModelFacade>,
) -> FailureReport {
    let context = ScenarioContext::new(spec);
    let selected = spec.rules.clone().unwrap_or_else(|| ALL_RULES.to_vec());
    let mut report = FailureReport::new(context.scenario_id.clone());
    for rule in selected {
        let failures = match rule {
            RuleId::Economizers => rules::economizers::evaluate(baseline, &context),
            RuleId::SupplyAirTemp => rules::supply_air_temp::evaluate(baseline, &context),
            RuleId::VavMinFlow => rules::vav_min_flow::evaluate(baseline, &context),
            RuleId::PlantControls => rules::plant_controls::evaluate(baseline, &context),
            RuleId::PlantEquipment => rules::plant_equipment::evaluate(baseline, &context),
            RuleId::CoilEfficiency => rules::coil_efficiency::evaluate(baseline, &context),
            RuleId::FanPower => rules::fan_power::evaluate(baseline, &context),
            RuleId::Topology => rules::topology::evaluate(baseline, &context),
            RuleId::SystemType => rules::system_type::evaluate(baseline, &context),
            RuleId::Ventilation => rules::ventilation::evaluate(baseline, proposed),
        };
        tracing::debug!(
            scenario = %context.scenario_id,
            rule = %rule,
            failures = failures.len(),
            "rule evaluated"
        );
        report.extend(failures);
    }
    report
}

/// Load a scenario's models from disk and evaluate it. Model paths resolve
/// relative to `base_dir` (normally the suite file's directory).
pub fn run_scenario(spec: &ScenarioSpec, base_dir: &Path) -> Result<FailureReport, CheckError> {
    let baseline_model = load_model(&base_dir.join(&spec.baseline_model))?;
    let proposed_model = spec
        .proposed_model
        .as_ref()
        .map(|path| load_model(&base_dir.join(path)))
        .transpose()?;
    let baseline = ModelFacade::new(&baseline_model);
    let proposed = proposed_model.as_ref().map(ModelFacade::new);
    Ok(evaluate_scenario(spec, &baseline, proposed.as_ref()))
}

fn load_model(path: &Path) -> Result<crate::input::BuildingModel, CheckError> {
    let file = File::open(path)
        .map_err(|e| ModelLoadError::new(anyhow!("could not open {}: {e}", path.display())))?;
    ingest_model(file).map_err(|e| CheckError::ModelLoad(ModelLoadError::new(e)))
}
