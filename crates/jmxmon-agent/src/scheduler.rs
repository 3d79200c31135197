//! The fixed-period polling loop.

use chrono::Utc;
use jmxmon_collector::{RateState, TargetSampler};
use jmxmon_common::spec::AttributeSpec;
use jmxmon_common::types::{PassReport, Period, Target, TargetReport};
use jmxmon_output::OutputManager;
use std::future::Future;
use tokio::time::{sleep_until, Instant};

/// A target and the rate state that lives and dies with it.
#[derive(Debug)]
pub struct TargetSlot {
    pub target: Target,
    pub state: RateState,
}

/// Samples every target once per period, one after another, and hands
/// each pass to the outputs.
///
/// Wake-ups are anchored: the next pass is due exactly one period after
/// the previous due time, not after the previous pass finished, so
/// processing time never accumulates as drift.
pub struct PollScheduler {
    sampler: TargetSampler,
    slots: Vec<TargetSlot>,
    specs: Vec<AttributeSpec>,
    period: Period,
    outputs: OutputManager,
}

impl PollScheduler {
    pub fn new(
        sampler: TargetSampler,
        targets: Vec<Target>,
        specs: Vec<AttributeSpec>,
        period: Period,
        outputs: OutputManager,
    ) -> Self {
        let slots = targets
            .into_iter()
            .map(|target| TargetSlot {
                target,
                state: RateState::new(),
            })
            .collect();
        Self {
            sampler,
            slots,
            specs,
            period,
            outputs,
        }
    }

    pub fn slots(&self) -> &[TargetSlot] {
        &self.slots
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Samples all targets in order, then publishes the pass.
    ///
    /// A failing target is recorded in the error log right away and shows
    /// up in the report as failed; the remaining targets are sampled as
    /// usual.
    pub async fn run_pass(&mut self) -> PassReport {
        let timestamp = Utc::now();
        let mut targets = Vec::with_capacity(self.slots.len());
        for slot in &mut self.slots {
            let outcome = self
                .sampler
                .sample(&slot.target, &mut slot.state, &self.specs, self.period)
                .await;
            let report = TargetReport {
                target: slot.target.clone(),
                outcome,
            };
            if let Some(failure) = report.failure() {
                self.outputs.record_failure(failure);
            }
            targets.push(report);
        }

        let report = PassReport { timestamp, targets };
        let failed = report.targets.iter().filter(|t| t.failure().is_some()).count();
        let writer_errors = self.outputs.publish(&report);
        tracing::debug!(
            targets = report.targets.len(),
            failed,
            writer_errors,
            "Pass complete"
        );
        report
    }

    /// Runs passes until `shutdown` resolves. Returns the number of passes.
    ///
    /// `shutdown` is only observed between passes; a pass in progress
    /// always completes and is published.
    pub async fn run<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            period_secs = self.period.secs(),
            targets = self.slots.len(),
            attributes = self.specs.len(),
            transport = self.sampler.transport_name(),
            "Starting poll loop"
        );
        tokio::pin!(shutdown);

        let period = self.period.as_duration();
        let mut anchor = Instant::now();
        let mut passes = 0;
        loop {
            self.run_pass().await;
            passes += 1;

            anchor += period;
            let now = Instant::now();
            if anchor <= now {
                let behind = now - anchor;
                tracing::warn!(behind_ms = behind.as_millis() as u64, "Pass overran the period");
                // Skip missed boundaries so at most one pass runs late.
                while anchor + period <= now {
                    anchor += period;
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(passes, "Poll loop stopped");
                    break;
                }
                _ = sleep_until(anchor) => {}
            }
        }
        passes
    }
}
