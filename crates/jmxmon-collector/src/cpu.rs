use crate::rate::RateCalculator;
use crate::state::{CpuReading, MetricKey, RateState, Reading};
use crate::transport::Connection;
use jmxmon_common::types::CpuPercent;

/// Object name of the operating system bean.
pub const OS_OBJECT: &str = "java.lang:type=OperatingSystem";

/// Reads the process CPU time and converts it into a percentage.
///
/// Never fails: anything that prevents a reading yields
/// [`CpuPercent::Unavailable`] and leaves `state` untouched.
pub async fn sample_cpu(conn: &dyn Connection, state: &mut RateState, uptime_ms: i64) -> CpuPercent {
    let cpu_time_ns = match conn.read_attribute(OS_OBJECT, "ProcessCpuTime").await {
        Ok(value) => match value.as_counter() {
            Some(ns) => ns,
            None => {
                tracing::debug!(found = value.kind(), "ProcessCpuTime not readable");
                return CpuPercent::Unavailable;
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "ProcessCpuTime not readable");
            return CpuPercent::Unavailable;
        }
    };
    let cores = match conn.read_attribute(OS_OBJECT, "AvailableProcessors").await {
        Ok(value) => value.as_counter().unwrap_or(1),
        Err(e) => {
            tracing::debug!(error = %e, "AvailableProcessors not readable");
            return CpuPercent::Unavailable;
        }
    };

    let current = CpuReading {
        uptime_ms,
        cpu_time_ns,
    };
    let previous = state.cpu();
    state.replace(MetricKey::Cpu, Reading::Cpu(current));
    RateCalculator::cpu(current, previous, cores)
}
