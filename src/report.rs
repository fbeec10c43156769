//! Failure records and per-scenario reports.
//!
//! Rules never assert or raise on a violation. They push [`Failure`] values
//! and keep going, so one report carries every defect found in a scenario.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strum_macros::{Display as StrumDisplay, EnumString};

/// Identifies the rule family a failure came from.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, StrumDisplay, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    Economizers,
    SupplyAirTemp,
    VavMinFlow,
    PlantControls,
    PlantEquipment,
    CoilEfficiency,
    FanPower,
    Topology,
    SystemType,
    Ventilation,
}

/// Missing objects, wrong values and ambiguous model data are distinct
/// findings; a report keeps them apart so "no setpoint manager at all" never
/// reads as a numeric mismatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingObject,
    ValueMismatch,
    UnexpectedObject,
    AmbiguousModel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Failure {
    pub rule: RuleId,
    pub kind: FailureKind,
    /// Name of the zone/system/loop/equipment the finding pertains to.
    pub object: String,
    pub expected: String,
    pub actual: String,
    pub units: Option<String>,
    pub message: String,
}

impl Failure {
    pub fn value_mismatch(
        rule: RuleId,
        object: impl Display,
        quantity: impl Display,
        expected: impl Display,
        actual: impl Display,
        units: Option<&str>,
    ) -> Self {
        let unit_suffix = units.map(|u| format!(" {u}")).unwrap_or_default();
        Self {
            rule,
            kind: FailureKind::ValueMismatch,
            object: object.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            units: units.map(str::to_string),
            message: format!(
                "{object}: expected {quantity} {expected}{unit_suffix}, found {actual}{unit_suffix}"
            ),
        }
    }

    pub fn missing_object(rule: RuleId, object: impl Display, expected: impl Display) -> Self {
        Self {
            rule,
            kind: FailureKind::MissingObject,
            object: object.to_string(),
            expected: expected.to_string(),
            actual: "(not found)".into(),
            units: None,
            message: format!("{object}: expected {expected}, found none"),
        }
    }

    pub fn unexpected_object(rule: RuleId, object: impl Display, found: impl Display) -> Self {
        Self {
            rule,
            kind: FailureKind::UnexpectedObject,
            object: object.to_string(),
            expected: "(absent)".into(),
            actual: found.to_string(),
            units: None,
            message: format!("{object}: found {found} where none was expected"),
        }
    }

    pub fn ambiguous_model(rule: RuleId, object: impl Display, detail: impl Display) -> Self {
        Self {
            rule,
            kind: FailureKind::AmbiguousModel,
            object: object.to_string(),
            expected: "(unambiguous model)".into(),
            actual: detail.to_string(),
            units: None,
            message: format!("{object}: ambiguous model data: {detail}"),
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

/// All failures found while evaluating one scenario, in rule order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FailureReport {
    pub scenario: String,
    pub failures: Vec<Failure>,
}

impl FailureReport {
    pub fn new(scenario: impl Display) -> Self {
        Self {
            scenario: scenario.to_string(),
            failures: Vec::new(),
        }
    }

    pub fn extend(&mut self, failures: impl IntoIterator<Item = Failure>) {
        self.failures.extend(failures);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn failures_for(&self, rule: RuleId) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(move |f| f.rule == rule)
    }
}

impl Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "{}: no failures", self.scenario);
        }
        writeln!(f, "{}: {} failure(s)", self.scenario, self.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            writeln!(f, "  {}. {failure}", i + 1)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ReportRow<'a> {
    scenario: &'a str,
    rule: RuleId,
    kind: FailureKind,
    object: &'a str,
    expected: &'a str,
    actual: &'a str,
    units: &'a str,
    message: &'a str,
}

/// One CSV row per failure, headed, in report order.
pub fn write_report_csv(
    report: &FailureReport,
    writer: impl std::io::Write,
) -> Result<(), anyhow::Error> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    for failure in &report.failures {
        csv_writer.serialize(ReportRow {
            scenario: &report.scenario,
            rule: failure.rule,
            kind: failure.kind,
            object: &failure.object,
            expected: &failure.expected,
            actual: &failure.actual,
            units: failure.units.as_deref().unwrap_or(""),
            message: &failure.message,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
