use crate::error::{Result, SampleError};
use crate::rate::RateCalculator;
use crate::state::{MetricKey, RateState, Reading, ValueReading};
use crate::transport::Connection;
use chrono::{DateTime, Utc};
use jmxmon_common::remote::RemoteValue;
use jmxmon_common::spec::{AttributeAccess, AttributePath, AttributeSpec};
use jmxmon_common::types::{Observation, ObservationValue, Period, Target};

/// Samples every configured attribute, in configuration order.
///
/// A spec whose pattern matches nothing contributes one unresolved
/// observation. Any remote error aborts the whole call.
pub async fn sample_attributes(
    conn: &dyn Connection,
    target: &Target,
    state: &mut RateState,
    specs: &[AttributeSpec],
    uptime_ms: i64,
    period: Period,
    timestamp: DateTime<Utc>,
) -> Result<Vec<Observation>> {
    let mut observations = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut objects = conn.query_names(&spec.object_pattern).await?;
        if objects.is_empty() {
            tracing::debug!(server = %target.display_name, pattern = %spec.object_pattern, "No object matches");
            observations.push(Observation::unresolved(target, spec, timestamp));
            continue;
        }
        objects.sort();

        for object in &objects {
            let value = fetch(conn, spec, object).await?;
            let formatted = format_value(spec, object, &value, state, uptime_ms, period);
            observations.push(Observation {
                target: target.display_name.clone(),
                title: spec.title.clone(),
                timestamp,
                value: ObservationValue::Value(formatted),
                key: format!("{}::{}", spec.attribute_name, object),
            });
        }
    }
    Ok(observations)
}

async fn fetch(conn: &dyn Connection, spec: &AttributeSpec, object: &str) -> Result<RemoteValue> {
    match &spec.access {
        AttributeAccess::Invoke { method, params } => conn.invoke(object, method, params).await,
        AttributeAccess::Read(path) => {
            let root = conn.read_attribute(object, path.attribute()).await?;
            walk(root, path)
        }
    }
}

fn walk(root: RemoteValue, path: &AttributePath) -> Result<RemoteValue> {
    if path.nested().is_empty() {
        return Ok(root);
    }
    root.resolve_path(path.nested())
        .cloned()
        .map_err(|miss| SampleError::PathUnresolved {
            path: path.to_string(),
            segment: miss.segment,
            found: miss.found,
        })
}

/// Formats one value, routing non-negative integers of rate specs through
/// the rate calculator.
fn format_value(
    spec: &AttributeSpec,
    object: &str,
    value: &RemoteValue,
    state: &mut RateState,
    uptime_ms: i64,
    period: Period,
) -> String {
    if spec.is_rate() {
        if let Some(current) = value.as_counter().filter(|v| *v >= 0) {
            let key = MetricKey::attribute(&spec.attribute_name, object);
            let current = ValueReading {
                value: current,
                uptime_ms,
            };
            let previous = state.replace(key, Reading::Value(current));
            let previous = match previous {
                Some(Reading::Value(reading)) => Some(reading),
                _ => None,
            };
            return RateCalculator::attribute(current, previous, period).display();
        }
    }
    match value {
        RemoteValue::Float(v) => format!("{v:.2}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(record: &str) -> AttributeSpec {
        AttributeSpec::parse(record).unwrap().unwrap()
    }

    #[test]
    fn plain_float_has_two_decimals() {
        let spec = spec("; Load; SystemLoadAverage; java.lang:type=OperatingSystem");
        let mut state = RateState::new();
        let out = format_value(
            &spec,
            "java.lang:type=OperatingSystem",
            &RemoteValue::Float(0.456),
            &mut state,
            1_000,
            Period::from_secs(10),
        );
        assert_eq!(out, "0.46");
        assert!(state.is_empty());
    }

    #[test]
    fn rate_spec_with_text_value_is_plain() {
        let spec = spec("diff; State; State; x:type=Y");
        let mut state = RateState::new();
        let out = format_value(
            &spec,
            "x:type=Y",
            &RemoteValue::Text("RUNNING".into()),
            &mut state,
            1_000,
            Period::from_secs(10),
        );
        assert_eq!(out, "RUNNING");
        assert!(state.is_empty());
    }

    #[test]
    fn rate_spec_with_negative_value_is_plain() {
        let spec = spec("diff; Count; Count; x:type=Y");
        let mut state = RateState::new();
        let out = format_value(
            &spec,
            "x:type=Y",
            &RemoteValue::Integer(-1),
            &mut state,
            1_000,
            Period::from_secs(10),
        );
        assert_eq!(out, "-1");
    }

    #[test]
    fn rate_spec_keys_state_per_object() {
        let spec = spec("rate; Requests; requestCount; Catalina:type=GlobalRequestProcessor,*");
        let mut state = RateState::new();
        let period = Period::from_secs(10);
        format_value(&spec, "a:name=1", &RemoteValue::Integer(60), &mut state, 60_000, period);
        format_value(&spec, "a:name=2", &RemoteValue::Integer(60), &mut state, 60_000, period);
        assert_eq!(state.len(), 2);
        let second = format_value(&spec, "a:name=1", &RemoteValue::Integer(660), &mut state, 70_000, period);
        assert_eq!(second, "1.0");
    }
}
