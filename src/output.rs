use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Destination for the per-scenario failure reports and the suite summary.
/// Each report is keyed by a filename-safe location key derived from the
/// scenario id.
pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// True when nothing written here is observable, letting the suite
    /// runner skip report rendering entirely.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each report to `<directory>/<prefix><key>.csv`.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_prefix: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_prefix: String) -> Self {
        Self {
            directory_path,
            file_prefix,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(self.directory_path.join(
            format!("{}{}.csv", self.file_prefix, location_key),
        ))?))
    }
}

/// Discards everything; used when callers only want the in-memory outcome.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}
