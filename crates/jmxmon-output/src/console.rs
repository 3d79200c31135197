use crate::error::{OutputError, Result};
use crate::format::std_timestamp;
use crate::OutputWriter;
use jmxmon_common::types::{ObservationValue, PassReport};
use std::io::{self, Write};

/// Human-readable lines on a terminal.
///
/// All GC sums come first, then all CPU values, then resolved attributes,
/// each prefixed with the time and the target's display name.
pub struct ConsoleWriter<W> {
    out: W,
}

impl ConsoleWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> ConsoleWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn render(&mut self, report: &PassReport) -> io::Result<()> {
        let mut buf = String::new();
        for entry in &report.targets {
            if let Some(gc) = entry.gc() {
                buf.push_str(&format!(
                    "{}: {}: GarbageCollectionPercent = {:.1} %\n",
                    std_timestamp(gc.timestamp),
                    entry.target.display_name,
                    gc.time_percent_sum
                ));
            }
        }
        for entry in &report.targets {
            if let Some(gc) = entry.gc() {
                buf.push_str(&format!(
                    "{}: {}: CpuTimePercent = {} %\n",
                    std_timestamp(gc.timestamp),
                    entry.target.display_name,
                    gc.cpu
                ));
            }
        }
        for entry in &report.targets {
            for obs in entry.attributes() {
                let ObservationValue::Value(value) = &obs.value else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                buf.push_str(&format!(
                    "{}: {}: {} = {}\n",
                    std_timestamp(obs.timestamp),
                    entry.target.display_name,
                    obs.title,
                    value
                ));
            }
        }
        buf.push('\n');

        self.out.write_all(buf.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write + Send> OutputWriter for ConsoleWriter<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn write_pass(&mut self, report: &PassReport) -> Result<()> {
        self.render(report).map_err(OutputError::Console)
    }
}
