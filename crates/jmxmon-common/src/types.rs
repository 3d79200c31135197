use crate::spec::AttributeSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Value written in place of a metric that could not be obtained.
pub const ERROR_SENTINEL: &str = "-0.1";

/// Observation title of the summed GC time percentage.
pub const GC_PERCENT_TITLE: &str = "GarbageCollectionPercent";

/// Observation title of the process CPU percentage.
pub const CPU_PERCENT_TITLE: &str = "CpuTimePercent";

/// Login for a remote process.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// One remote process to monitor. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// `host:port` of the management endpoint.
    pub address: String,
    pub credentials: Option<Credentials>,
    /// Configured name, or the address when none was given.
    pub name: String,
    /// `name-address` when a distinct name was given, otherwise the address.
    pub display_name: String,
}

impl Target {
    /// Builds a target, deriving its names.
    ///
    /// # Examples
    ///
    /// ```
    /// use jmxmon_common::types::Target;
    ///
    /// let named = Target::new("srv1:7091", Some("shop"), None);
    /// assert_eq!(named.display_name, "shop-srv1:7091");
    ///
    /// let bare = Target::new("srv1:7091", None, None);
    /// assert_eq!(bare.name, "srv1:7091");
    /// assert_eq!(bare.display_name, "srv1:7091");
    /// ```
    pub fn new(address: &str, name: Option<&str>, credentials: Option<Credentials>) -> Self {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let display_name = match name {
            Some(n) => format!("{n}-{address}"),
            None => address.to_string(),
        };
        Self {
            address: address.to_string(),
            credentials,
            name: name.unwrap_or(address).to_string(),
            display_name,
        }
    }
}

/// Polling period in whole seconds, never below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period(u32);

impl Period {
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.clamp(1, u64::from(u32::MAX)) as u32)
    }

    pub fn secs(self) -> i64 {
        i64::from(self.0)
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl Default for Period {
    fn default() -> Self {
        Self(10)
    }
}

/// How a rate was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateMode {
    /// Difference of two consecutive readings.
    Delta,
    /// Lifetime average from a single reading and process uptime.
    Bootstrap,
}

/// Formatted value of an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObservationValue {
    Value(String),
    /// The attribute's pattern matched nothing, or the target failed.
    Unresolved,
}

impl ObservationValue {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ObservationValue::Value(_))
    }
}

impl fmt::Display for ObservationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationValue::Value(v) => write!(f, "{v}"),
            ObservationValue::Unresolved => write!(f, "{ERROR_SENTINEL}"),
        }
    }
}

/// One formatted, timestamped metric value ready for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Display name of the target.
    pub target: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub value: ObservationValue,
    /// Grouping key, e.g. `attribute::objectInstance`.
    pub key: String,
}

impl Observation {
    /// The placeholder emitted for an attribute that produced no value.
    pub fn unresolved(target: &Target, spec: &AttributeSpec, timestamp: DateTime<Utc>) -> Self {
        Self {
            target: target.display_name.clone(),
            title: spec.title.clone(),
            timestamp,
            value: ObservationValue::Unresolved,
            key: format!("{}::{}", spec.attribute_name, spec.object_pattern),
        }
    }
}

/// Per-period figures of one garbage collector kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcMetric {
    /// Normalized collector name.
    pub name: String,
    pub count_per_period: i64,
    pub time_percent: f64,
    pub mode: RateMode,
}

/// Process CPU usage in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuPercent {
    /// Always within 0..=99.
    Percent(u8),
    Unavailable,
}

impl fmt::Display for CpuPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuPercent::Percent(p) => write!(f, "{p}"),
            CpuPercent::Unavailable => write!(f, "-1"),
        }
    }
}

/// All collectors of one target for one pass, plus CPU usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcGroup {
    pub timestamp: DateTime<Utc>,
    pub collectors: Vec<GcMetric>,
    pub time_percent_sum: f64,
    pub cpu: CpuPercent,
}

/// A successful sampling pass of one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSample {
    pub gc: GcGroup,
    /// Custom attribute values in configuration order.
    pub attributes: Vec<Observation>,
}

impl TargetSample {
    /// All observations in output order: GC, CPU, then attributes.
    pub fn observations(&self, target: &Target) -> Vec<Observation> {
        let mut out = Vec::with_capacity(self.attributes.len() + 2);
        out.push(Observation {
            target: target.display_name.clone(),
            title: GC_PERCENT_TITLE.to_string(),
            timestamp: self.gc.timestamp,
            value: ObservationValue::Value(format!("{:.1}", self.gc.time_percent_sum)),
            key: GC_PERCENT_TITLE.to_string(),
        });
        out.push(Observation {
            target: target.display_name.clone(),
            title: CPU_PERCENT_TITLE.to_string(),
            timestamp: self.gc.timestamp,
            value: ObservationValue::Value(self.gc.cpu.to_string()),
            key: CPU_PERCENT_TITLE.to_string(),
        });
        out.extend(self.attributes.iter().cloned());
        out
    }
}

/// Why a target produced no data in a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetFailure {
    pub timestamp: DateTime<Utc>,
    pub target: String,
    pub address: String,
    pub cause: String,
}

/// Result of sampling one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TargetOutcome {
    Sampled(TargetSample),
    Failed {
        failure: TargetFailure,
        /// One unresolved observation per configured spec.
        placeholders: Vec<Observation>,
    },
}

/// A target together with what its latest pass produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetReport {
    pub target: Target,
    pub outcome: TargetOutcome,
}

impl TargetReport {
    pub fn gc(&self) -> Option<&GcGroup> {
        match &self.outcome {
            TargetOutcome::Sampled(sample) => Some(&sample.gc),
            TargetOutcome::Failed { .. } => None,
        }
    }

    /// Attribute observations, or placeholders when the target failed.
    pub fn attributes(&self) -> &[Observation] {
        match &self.outcome {
            TargetOutcome::Sampled(sample) => &sample.attributes,
            TargetOutcome::Failed { placeholders, .. } => placeholders,
        }
    }

    pub fn failure(&self) -> Option<&TargetFailure> {
        match &self.outcome {
            TargetOutcome::Failed { failure, .. } => Some(failure),
            TargetOutcome::Sampled(_) => None,
        }
    }
}

/// Everything one pass produced, handed to every output writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    pub timestamp: DateTime<Utc>,
    pub targets: Vec<TargetReport>,
}
