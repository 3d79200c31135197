use crate::attributes::sample_attributes;
use crate::cpu::sample_cpu;
use crate::error::Result;
use crate::gc::sample_gc;
use crate::state::RateState;
use crate::transport::{Connection, Transport};
use chrono::{DateTime, Utc};
use jmxmon_common::spec::AttributeSpec;
use jmxmon_common::types::{
    GcGroup, Observation, Period, Target, TargetFailure, TargetOutcome, TargetSample,
};
use std::sync::Arc;

/// Runs one full sampling pass against one target.
///
/// A pass reads the uptime, every garbage collector, the CPU time and each
/// configured attribute over a single connection. Any failure discards the
/// whole pass and clears the target's [`RateState`], so the next successful
/// pass bootstraps every metric. Failures are returned, never propagated.
#[derive(Clone)]
pub struct TargetSampler {
    transport: Arc<dyn Transport>,
}

impl TargetSampler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub async fn sample(
        &self,
        target: &Target,
        state: &mut RateState,
        specs: &[AttributeSpec],
        period: Period,
    ) -> TargetOutcome {
        let timestamp = Utc::now();
        let result = match self.transport.connect(target).await {
            Ok(conn) => {
                let result = sample_connected(conn.as_ref(), target, state, specs, period, timestamp).await;
                conn.close().await;
                result
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(sample) => {
                tracing::debug!(
                    server = %target.display_name,
                    collectors = sample.gc.collectors.len(),
                    attributes = sample.attributes.len(),
                    "Target sampled"
                );
                TargetOutcome::Sampled(sample)
            }
            Err(e) => {
                state.clear();
                tracing::warn!(server = %target.display_name, error = %e, "Target sampling failed");
                TargetOutcome::Failed {
                    failure: TargetFailure {
                        timestamp,
                        target: target.display_name.clone(),
                        address: target.address.clone(),
                        cause: e.to_string(),
                    },
                    placeholders: specs
                        .iter()
                        .map(|spec| Observation::unresolved(target, spec, timestamp))
                        .collect(),
                }
            }
        }
    }
}

async fn sample_connected(
    conn: &dyn Connection,
    target: &Target,
    state: &mut RateState,
    specs: &[AttributeSpec],
    period: Period,
    timestamp: DateTime<Utc>,
) -> Result<TargetSample> {
    let uptime_ms = conn.uptime_ms().await?;
    let (collectors, time_percent_sum) = sample_gc(conn, state, uptime_ms, period).await?;
    let cpu = sample_cpu(conn, state, uptime_ms).await;
    let attributes =
        sample_attributes(conn, target, state, specs, uptime_ms, period, timestamp).await?;

    Ok(TargetSample {
        gc: GcGroup {
            timestamp,
            collectors,
            time_percent_sum,
            cpu,
        },
        attributes,
    })
}
