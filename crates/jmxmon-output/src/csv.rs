//! Append-only `;`-separated logs for spreadsheets.

use crate::error::{IoContext, Result};
use crate::format::{per_target_path, single_line, std_timestamp};
use crate::OutputWriter;
use jmxmon_common::types::{GcGroup, PassReport, ERROR_SENTINEL};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends `text` to `path`, writing `header` first if the file is new.
fn append(path: &Path, header: impl FnOnce() -> String, text: &str) -> Result<()> {
    let exists = path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .at(path)?;
    if !exists {
        file.write_all(header().as_bytes()).at(path)?;
    }
    file.write_all(text.as_bytes()).at(path)
}

/// One row per pass covering every target: GC sums, CPU values, then
/// attribute values. Failed targets and unresolved values write `-0.1`.
pub struct CombinedCsvWriter {
    path: PathBuf,
}

impl CombinedCsvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn header(report: &PassReport) -> String {
        let mut out = String::from("Date/Time;");
        for entry in &report.targets {
            out.push_str(&format!(" GC-{};", entry.target.name));
        }
        for entry in &report.targets {
            out.push_str(&format!(" CPU-{};", entry.target.name));
        }
        for entry in &report.targets {
            for obs in entry.attributes() {
                out.push_str(&format!(" {}-{};", obs.title, entry.target.name));
            }
        }
        out.push('\n');
        out
    }

    fn row(report: &PassReport) -> String {
        let mut out = format!("{};", std_timestamp(report.timestamp));
        for entry in &report.targets {
            match entry.gc() {
                Some(gc) => out.push_str(&format!(" {:.1};", gc.time_percent_sum)),
                None => out.push_str(&format!(" {ERROR_SENTINEL};")),
            }
        }
        for entry in &report.targets {
            match entry.gc() {
                Some(gc) => out.push_str(&format!(" {};", gc.cpu)),
                None => out.push_str(&format!(" {ERROR_SENTINEL};")),
            }
        }
        for entry in &report.targets {
            for obs in entry.attributes() {
                out.push_str(&format!(" {};", single_line(&obs.value.to_string())));
            }
        }
        out.push('\n');
        out
    }
}

impl OutputWriter for CombinedCsvWriter {
    fn name(&self) -> &str {
        "csv"
    }

    fn write_pass(&mut self, report: &PassReport) -> Result<()> {
        if report.targets.is_empty() {
            return Ok(());
        }
        append(&self.path, || Self::header(report), &Self::row(report))
    }
}

/// One file per target with every collector's count and time share.
///
/// Targets that failed or report no collectors are skipped for the pass.
pub struct PerTargetCsvWriter {
    base: PathBuf,
}

impl PerTargetCsvWriter {
    /// `base` is the combined CSV path; see [`per_target_path`].
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn column_prefix(name: &str) -> String {
        let stripped = match name.rfind(" Collector") {
            Some(pos) if pos > 1 => &name[..pos],
            _ => name,
        };
        let stripped = stripped.trim();
        if stripped.is_empty() {
            String::new()
        } else {
            format!("{stripped}-")
        }
    }

    fn header(gc: &GcGroup) -> String {
        let mut out = String::from("Date/Time; ");
        for collector in &gc.collectors {
            let prefix = Self::column_prefix(&collector.name);
            out.push_str(&format!("{prefix}CountPerPeriod; {prefix}TimePercent; "));
        }
        out.push_str("TimePercentSum;\n");
        out
    }

    fn row(gc: &GcGroup) -> String {
        let mut out = format!("{}; ", std_timestamp(gc.timestamp));
        for collector in &gc.collectors {
            out.push_str(&format!(
                "{}; {:.1}; ",
                collector.count_per_period, collector.time_percent
            ));
        }
        out.push_str(&format!("{:.1}; \n", gc.time_percent_sum));
        out
    }
}

impl OutputWriter for PerTargetCsvWriter {
    fn name(&self) -> &str {
        "per-target-csv"
    }

    fn write_pass(&mut self, report: &PassReport) -> Result<()> {
        for entry in &report.targets {
            let Some(gc) = entry.gc().filter(|gc| !gc.collectors.is_empty()) else {
                continue;
            };
            let path = per_target_path(&self.base, &entry.target.address);
            append(&path, || Self::header(gc), &Self::row(gc))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_prefix_strips_collector_suffix() {
        assert_eq!(PerTargetCsvWriter::column_prefix("G1 Young Collector"), "G1 Young-");
        assert_eq!(PerTargetCsvWriter::column_prefix("Old Generation"), "Old Generation-");
        assert_eq!(PerTargetCsvWriter::column_prefix(""), "");
    }
}
