pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod report;
pub mod scenario;

#[macro_use]
extern crate is_close;

use crate::errors::{CheckError, ReportingError};
use crate::output::Output;
use crate::report::{write_report_csv, FailureReport};
use crate::scenario::{ingest_suite, run_scenario};
use anyhow::anyhow;
use std::io::Read;
use std::path::Path;

pub use crate::report::{Failure, FailureKind, RuleId};
pub use crate::scenario::{evaluate_scenario, ScenarioContext, ScenarioSpec, SuiteSpec, ALL_RULES};

/// What running a suite produced: one report per scenario, in suite order.
#[derive(Debug)]
pub struct SuiteOutcome {
    pub reports: Vec<FailureReport>,
}

impl SuiteOutcome {
    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(FailureReport::is_empty)
    }

    pub fn total_failures(&self) -> usize {
        self.reports.iter().map(FailureReport::len).sum()
    }
}

/// Run every scenario in a suite, writing one CSV report per scenario plus a
/// summary, keyed through the output's location scheme.
pub fn run_suite(
    suite: impl Read,
    base_dir: &Path,
    output: impl Output,
) -> Result<SuiteOutcome, CheckError> {
    let suite = ingest_suite(suite)?;
    let mut reports = Vec::with_capacity(suite.scenarios.len());
    for spec in &suite.scenarios {
        let report = run_scenario(spec, base_dir)?;
        tracing::info!(
            scenario = %spec.id(),
            failures = report.len(),
            "scenario evaluated"
        );
        if !output.is_noop() {
            let key = location_key(&spec.id());
            let writer = output
                .writer_for_location_key(&key)
                .map_err(|e| CheckError::ErrorInReporting(ReportingError::new(e)))?;
            write_report_csv(&report, writer)
                .map_err(|e| CheckError::ErrorInReporting(ReportingError::new(e)))?;
        }
        reports.push(report);
    }
    let outcome = SuiteOutcome { reports };
    if !output.is_noop() {
        write_summary(&outcome, &output)
            .map_err(|e| CheckError::ErrorInReporting(ReportingError::new(e)))?;
    }
    Ok(outcome)
}

fn write_summary(outcome: &SuiteOutcome, output: &impl Output) -> Result<(), anyhow::Error> {
    let writer = output.writer_for_location_key("summary")?;
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(["scenario", "failures"])?;
    for report in &outcome.reports {
        csv_writer.write_record([report.scenario.as_str(), &report.len().to_string()])?;
    }
    csv_writer.flush().map_err(|e| anyhow!(e))?;
    Ok(())
}

/// Scenario ids go straight into file names; squash the characters that
/// would not survive there.
fn location_key(scenario_id: &str) -> String {
    scenario_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SinkOutput;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn location_keys_are_filename_safe() {
        assert_eq!(
            location_key("SmallOffice-90.1-2013-ASHRAE 169-2013-5B"),
            "SmallOffice-90.1-2013-ASHRAE_169-2013-5B"
        );
    }

    #[rstest]
    fn suite_runs_against_the_demo_pack() {
        let suite = std::fs::File::open("./demos/suite.json").unwrap();
        let outcome = run_suite(suite, Path::new("./demos"), SinkOutput).unwrap();
        assert!(outcome.is_clean(), "demo suite should evaluate clean");
        assert_eq!(outcome.total_failures(), 0);
    }
}
