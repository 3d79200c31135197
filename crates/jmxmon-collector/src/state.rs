//! Per-target memory of the last raw readings.

use std::collections::HashMap;
use std::fmt;

/// Identifies one tracked counter within a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKey {
    /// A garbage collector, by normalized name.
    Gc(String),
    /// Process CPU time. Never collides with a collector name.
    Cpu,
    /// A rate-mode custom attribute on one matched object instance.
    Attribute { attribute: String, object: String },
}

impl MetricKey {
    pub fn attribute(attribute: &str, object: &str) -> Self {
        MetricKey::Attribute {
            attribute: attribute.to_string(),
            object: object.to_string(),
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKey::Gc(name) => write!(f, "{name}"),
            MetricKey::Cpu => write!(f, "<cpu>"),
            MetricKey::Attribute { attribute, object } => write!(f, "{attribute}::{object}"),
        }
    }
}

/// Cumulative collection count and time of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterReading {
    pub count: i64,
    pub time_ms: i64,
}

/// Cumulative process CPU time and the uptime it was read at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuReading {
    pub uptime_ms: i64,
    pub cpu_time_ns: i64,
}

/// A single cumulative value and the uptime it was read at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueReading {
    pub value: i64,
    pub uptime_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Counters(CounterReading),
    Cpu(CpuReading),
    Value(ValueReading),
}

/// Last readings of one target, keyed by [`MetricKey`].
///
/// Owned by the scheduler alongside its target and lent to the sampler for
/// that target's pass only.
#[derive(Debug, Default, Clone)]
pub struct RateState {
    readings: HashMap<MetricKey, Reading>,
}

impl RateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MetricKey) -> Option<&Reading> {
        self.readings.get(key)
    }

    /// Stores `reading` under `key` and returns what was there before.
    pub fn replace(&mut self, key: MetricKey, reading: Reading) -> Option<Reading> {
        self.readings.insert(key, reading)
    }

    pub fn counters(&self, key: &MetricKey) -> Option<CounterReading> {
        match self.readings.get(key) {
            Some(Reading::Counters(r)) => Some(*r),
            _ => None,
        }
    }

    pub fn cpu(&self) -> Option<CpuReading> {
        match self.readings.get(&MetricKey::Cpu) {
            Some(Reading::Cpu(r)) => Some(*r),
            _ => None,
        }
    }

    pub fn value(&self, key: &MetricKey) -> Option<ValueReading> {
        match self.readings.get(key) {
            Some(Reading::Value(r)) => Some(*r),
            _ => None,
        }
    }

    /// Forgets everything; the next pass bootstraps every metric.
    pub fn clear(&mut self) {
        self.readings.clear();
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_key_is_distinct_from_gc_names() {
        let mut state = RateState::new();
        state.replace(
            MetricKey::Gc("<cpu>".into()),
            Reading::Counters(CounterReading { count: 1, time_ms: 2 }),
        );
        assert_eq!(state.cpu(), None);
        state.replace(
            MetricKey::Cpu,
            Reading::Cpu(CpuReading {
                uptime_ms: 10,
                cpu_time_ns: 20,
            }),
        );
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn typed_getters_ignore_other_shapes() {
        let mut state = RateState::new();
        let key = MetricKey::attribute("requestCount", "Catalina:type=GlobalRequestProcessor");
        state.replace(
            key.clone(),
            Reading::Value(ValueReading {
                value: 5,
                uptime_ms: 100,
            }),
        );
        assert_eq!(state.counters(&key), None);
        assert_eq!(state.value(&key).map(|r| r.value), Some(5));
    }

    #[test]
    fn replace_returns_previous_and_clear_empties() {
        let mut state = RateState::new();
        let key = MetricKey::Gc("Young Generation".into());
        let first = Reading::Counters(CounterReading { count: 1, time_ms: 1 });
        assert_eq!(state.replace(key.clone(), first), None);
        assert_eq!(
            state.replace(key, Reading::Counters(CounterReading { count: 2, time_ms: 3 })),
            Some(first)
        );
        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn key_display_matches_grouping_key() {
        assert_eq!(
            MetricKey::attribute("HeapMemoryUsage.used", "java.lang:type=Memory").to_string(),
            "HeapMemoryUsage.used::java.lang:type=Memory"
        );
    }
}
