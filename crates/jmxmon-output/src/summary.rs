use crate::error::{IoContext, Result};
use crate::format::{single_line, summary_prefix, summary_timestamp};
use crate::OutputWriter;
use chrono::Utc;
use jmxmon_common::types::{
    ObservationValue, PassReport, CPU_PERCENT_TITLE, GC_PERCENT_TITLE,
};
use std::path::PathBuf;

/// `key=value` file holding only the latest pass, for alerting tools.
///
/// The file is rewritten on every pass. Failed targets and unresolved
/// attributes are left out.
pub struct SummaryFileWriter {
    path: PathBuf,
}

impl SummaryFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn render(report: &PassReport) -> String {
        let now = Utc::now();
        let mut out = format!(
            "SecondsSince1970={}\nDateTime={}\n",
            now.timestamp(),
            summary_timestamp(now)
        );
        for entry in &report.targets {
            if let Some(gc) = entry.gc() {
                out.push_str(&format!(
                    "{}.{}={:.1}\n",
                    summary_prefix(&entry.target.name),
                    GC_PERCENT_TITLE,
                    gc.time_percent_sum
                ));
            }
        }
        for entry in &report.targets {
            if let Some(gc) = entry.gc() {
                out.push_str(&format!(
                    "{}.{}={}\n",
                    summary_prefix(&entry.target.name),
                    CPU_PERCENT_TITLE,
                    gc.cpu
                ));
            }
        }
        for entry in &report.targets {
            for obs in entry.attributes() {
                match &obs.value {
                    ObservationValue::Value(v) if !v.is_empty() => out.push_str(&format!(
                        "{}.{}={}\n",
                        summary_prefix(&entry.target.name),
                        obs.title,
                        single_line(v)
                    )),
                    _ => {}
                }
            }
        }
        out
    }
}

impl OutputWriter for SummaryFileWriter {
    fn name(&self) -> &str {
        "summary"
    }

    fn write_pass(&mut self, report: &PassReport) -> Result<()> {
        if report.targets.is_empty() {
            return Ok(());
        }
        std::fs::write(&self.path, Self::render(report)).at(&self.path)
    }
}
