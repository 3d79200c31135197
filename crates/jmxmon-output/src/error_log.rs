use crate::error::{IoContext, Result};
use crate::format::std_timestamp;
use jmxmon_common::types::TargetFailure;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only record of target failures.
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry: a blank line, `time, Url=address: `, the cause.
    pub fn record(&self, failure: &TargetFailure) -> Result<()> {
        let entry = format!(
            "\n{}, Url={}: \n{}\n",
            std_timestamp(failure.timestamp),
            failure.address,
            failure.cause
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .at(&self.path)?;
        file.write_all(entry.as_bytes()).at(&self.path)
    }
}
