//! Output collaborators of the jmxmon agent.
//!
//! Every pass produces one [`PassReport`]. The [`manager::OutputManager`]
//! hands it to each enabled [`OutputWriter`] in a fixed order: console,
//! alert summary file, combined CSV log, per-target GC logs. Target
//! failures go to the [`error_log::ErrorLog`] as they happen.

pub mod console;
pub mod csv;
pub mod error;
pub mod error_log;
pub mod format;
pub mod manager;
pub mod summary;


use jmxmon_common::types::PassReport;

/// A destination for the results of a pass.
pub trait OutputWriter: Send {
    /// Writer name used in logs (e.g. `"console"`, `"summary"`).
    fn name(&self) -> &str;

    /// Writes one pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be written. The manager
    /// logs it; later writers still run.
    fn write_pass(&mut self, report: &PassReport) -> error::Result<()>;
}

pub use manager::OutputManager;
