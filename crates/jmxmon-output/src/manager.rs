use crate::console::ConsoleWriter;
use crate::csv::{CombinedCsvWriter, PerTargetCsvWriter};
use crate::error_log::ErrorLog;
use crate::summary::SummaryFileWriter;
use crate::OutputWriter;
use jmxmon_common::types::{PassReport, TargetFailure};
use std::path::PathBuf;

/// Which outputs are enabled and where they write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSettings {
    pub console: bool,
    pub summary_file: Option<PathBuf>,
    pub csv_file: Option<PathBuf>,
    /// Also write one GC file per target next to `csv_file`.
    pub all_gc_values: bool,
    pub error_file: Option<PathBuf>,
}

/// Fans each pass out to the enabled writers in a fixed order.
///
/// The order is console, summary, combined CSV, per-target CSV regardless
/// of the order writers were added in.
#[derive(Default)]
pub struct OutputManager {
    console: Option<Box<dyn OutputWriter>>,
    summary: Option<Box<dyn OutputWriter>>,
    csv: Option<Box<dyn OutputWriter>>,
    per_target: Option<Box<dyn OutputWriter>>,
    error_log: Option<ErrorLog>,
}

impl OutputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &OutputSettings) -> Self {
        let mut manager = Self::new();
        if settings.console {
            manager = manager.with_console(ConsoleWriter::stdout());
        }
        if let Some(path) = &settings.summary_file {
            manager = manager.with_summary(SummaryFileWriter::new(path));
        }
        if let Some(path) = &settings.csv_file {
            manager = manager.with_csv(CombinedCsvWriter::new(path));
            if settings.all_gc_values {
                manager = manager.with_per_target(PerTargetCsvWriter::new(path));
            }
        }
        if let Some(path) = &settings.error_file {
            manager = manager.with_error_log(ErrorLog::new(path));
        }
        manager
    }

    pub fn with_console(mut self, writer: impl OutputWriter + 'static) -> Self {
        self.console = Some(Box::new(writer));
        self
    }

    pub fn with_summary(mut self, writer: impl OutputWriter + 'static) -> Self {
        self.summary = Some(Box::new(writer));
        self
    }

    pub fn with_csv(mut self, writer: impl OutputWriter + 'static) -> Self {
        self.csv = Some(Box::new(writer));
        self
    }

    pub fn with_per_target(mut self, writer: impl OutputWriter + 'static) -> Self {
        self.per_target = Some(Box::new(writer));
        self
    }

    pub fn with_error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = Some(log);
        self
    }

    /// Names of the enabled writers, in invocation order.
    pub fn writer_names(&self) -> Vec<&str> {
        self.ordered().map(|w| w.name()).collect()
    }

    fn ordered(&self) -> impl Iterator<Item = &dyn OutputWriter> + '_ {
        [&self.console, &self.summary, &self.csv, &self.per_target]
            .into_iter()
            .flatten()
            .map(|w| &**w)
    }

    /// Writes `report` to every writer. Returns how many writers failed.
    pub fn publish(&mut self, report: &PassReport) -> usize {
        let mut failed = 0;
        let writers = [
            &mut self.console,
            &mut self.summary,
            &mut self.csv,
            &mut self.per_target,
        ];
        for writer in writers.into_iter().flatten() {
            if let Err(e) = writer.write_pass(report) {
                tracing::error!(writer = writer.name(), error = %e, "Output writer failed");
                failed += 1;
            }
        }
        failed
    }

    /// Appends a target failure to the error log, if one is configured.
    pub fn record_failure(&self, failure: &TargetFailure) {
        let Some(log) = &self.error_log else {
            return;
        };
        if let Err(e) = log.record(failure) {
            tracing::error!(path = %log.path().display(), error = %e, "Cannot write error log");
        }
    }
}
