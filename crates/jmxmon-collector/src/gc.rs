use crate::error::{Result, SampleError};
use crate::rate::RateCalculator;
use crate::state::{CounterReading, MetricKey, RateState, Reading};
use crate::transport::Connection;
use jmxmon_common::remote::RemoteValue;
use jmxmon_common::types::{GcMetric, Period};

/// Pattern selecting every garbage collector bean.
pub const GC_PATTERN: &str = "java.lang:type=GarbageCollector,*";

/// Strips a collector name to its generation marker.
///
/// The name is cut to start at `Young`, then at `Old`, each only when the
/// marker sits after the start. Names without a marker are kept whole.
///
/// # Examples
///
/// ```
/// use jmxmon_collector::gc::normalize_gc_name;
///
/// assert_eq!(normalize_gc_name("ConcurrentMarkSweep Young Generation"), "Young Generation");
/// assert_eq!(normalize_gc_name("G1 Old Generation"), "Old Generation");
/// assert_eq!(normalize_gc_name("PS Scavenge"), "PS Scavenge");
/// ```
pub fn normalize_gc_name(raw: &str) -> &str {
    let mut name = raw;
    for marker in ["Young", "Old"] {
        if let Some(pos) = name.find(marker).filter(|&pos| pos > 0) {
            name = &name[pos..];
        }
    }
    name
}

/// Reads every collector and turns its counters into rates.
///
/// Returns the per-collector metrics in object name order and the sum of
/// their time percentages. Updates `state` under each normalized name.
pub async fn sample_gc(
    conn: &dyn Connection,
    state: &mut RateState,
    uptime_ms: i64,
    period: Period,
) -> Result<(Vec<GcMetric>, f64)> {
    let mut objects = conn.query_names(GC_PATTERN).await?;
    objects.sort();

    let mut metrics = Vec::with_capacity(objects.len());
    let mut time_percent_sum = 0.0;
    for object in &objects {
        let raw_name = conn.read_attribute(object, "Name").await?;
        let raw_name = match &raw_name {
            RemoteValue::Text(name) => name.clone(),
            other => return Err(unexpected(object, "Name", other)),
        };
        let count = counter(conn, object, "CollectionCount").await?;
        let time_ms = counter(conn, object, "CollectionTime").await?;

        let name = normalize_gc_name(&raw_name).to_string();
        let key = MetricKey::Gc(name.clone());
        let current = CounterReading { count, time_ms };
        let rate = RateCalculator::gc(current, state.counters(&key), uptime_ms, period);
        state.replace(key, Reading::Counters(current));

        tracing::trace!(collector = %name, count, time_ms, mode = ?rate.mode, "GC counters");
        time_percent_sum += rate.time_percent;
        metrics.push(GcMetric {
            name,
            count_per_period: rate.count_per_period,
            time_percent: rate.time_percent,
            mode: rate.mode,
        });
    }

    Ok((metrics, time_percent_sum))
}

async fn counter(conn: &dyn Connection, object: &str, attribute: &str) -> Result<i64> {
    let value = conn.read_attribute(object, attribute).await?;
    value
        .as_counter()
        .ok_or_else(|| unexpected(object, attribute, &value))
}

fn unexpected(object: &str, attribute: &str, value: &RemoteValue) -> SampleError {
    SampleError::UnexpectedValue {
        what: format!("{attribute} of {object}"),
        found: value.kind().to_string(),
    }
}
