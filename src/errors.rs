use thiserror::Error;

/// Top-level error taxonomy. Rule violations are never errors; they come back
/// as failure reports. These are for the cases where evaluation itself could
/// not proceed.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Scenario suite was considered invalid due to error: {0}")]
    InvalidSuite(#[from] anyhow::Error),
    #[error("Building model could not be loaded: {0}")]
    ModelLoad(#[from] ModelLoadError),
    #[error("Error while writing reports: {0}")]
    ErrorInReporting(ReportingError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ModelLoadError {
    error: anyhow::Error,
}

impl ModelLoadError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ReportingError {
    error: anyhow::Error,
}

impl ReportingError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
