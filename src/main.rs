extern crate prm_check;

use clap::Parser;
use prm_check::output::{FileOutput, SinkOutput};
use prm_check::run_suite;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CheckArgs {
    /// Scenario suite JSON file; model paths inside it resolve relative to
    /// its directory.
    suite_file: PathBuf,
    /// Directory for the per-scenario CSV reports. No reports are written
    /// when omitted.
    #[arg(long, short)]
    report_dir: Option<PathBuf>,
    /// Prefix for report file names.
    #[arg(long, default_value = "report_")]
    report_prefix: String,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = CheckArgs::parse();
    let suite = BufReader::new(File::open(&args.suite_file)?);
    let base_dir = args
        .suite_file
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let outcome = match &args.report_dir {
        Some(report_dir) => {
            std::fs::create_dir_all(report_dir)?;
            run_suite(
                suite,
                &base_dir,
                FileOutput::new(report_dir.clone(), args.report_prefix.clone()),
            )?
        }
        None => run_suite(suite, &base_dir, SinkOutput)?,
    };

    for report in &outcome.reports {
        if !report.is_empty() {
            println!("{report}");
        }
    }
    println!(
        "{} scenario(s) evaluated, {} failure(s) found",
        outcome.reports.len(),
        outcome.total_failures()
    );

    Ok(if outcome.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
