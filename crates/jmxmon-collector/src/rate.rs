//! Turns cumulative counters into per-period rates.
//!
//! All arithmetic is integer with truncating division, computed in tenths
//! of the displayed unit and divided by ten only at the end, so one decimal
//! of precision survives.
//!
//! Two modes exist. *Delta* uses the difference to the previous reading.
//! *Bootstrap* assumes the counter grew at a constant rate since process
//! start and needs only the current reading and the uptime. Bootstrap is
//! used on a key's first appearance and whenever a delta comes out
//! negative or cannot be represented, which means the process restarted or
//! the counter wrapped.

use crate::state::{CounterReading, CpuReading, ValueReading};
use jmxmon_common::types::{CpuPercent, Period, RateMode};

/// Highest CPU percentage ever reported.
pub const CPU_PERCENT_CAP: i64 = 99;

/// Collection count and time share of one collector over one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GcRate {
    pub count_per_period: i64,
    pub time_percent: f64,
    pub mode: RateMode,
}

/// Rate of a custom counter, in tenths of a unit per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRate {
    pub tenths: i64,
    pub mode: RateMode,
}

impl AttributeRate {
    /// One-decimal display form.
    pub fn display(&self) -> String {
        format!("{:.1}", self.tenths as f64 / 10.0)
    }
}

/// Stateless rate arithmetic.
pub struct RateCalculator;

impl RateCalculator {
    /// Rate of a collector's count and time counters.
    ///
    /// # Examples
    ///
    /// ```
    /// use jmxmon_collector::rate::RateCalculator;
    /// use jmxmon_collector::state::CounterReading;
    /// use jmxmon_common::types::{Period, RateMode};
    ///
    /// let prev = CounterReading { count: 10, time_ms: 200 };
    /// let now = CounterReading { count: 14, time_ms: 450 };
    /// let rate = RateCalculator::gc(now, Some(prev), 60_000, Period::from_secs(10));
    /// assert_eq!(rate.mode, RateMode::Delta);
    /// assert_eq!(rate.count_per_period, 4);
    /// assert_eq!(rate.time_percent, 2.5);
    /// ```
    pub fn gc(
        current: CounterReading,
        previous: Option<CounterReading>,
        uptime_ms: i64,
        period: Period,
    ) -> GcRate {
        let period_secs = period.secs();
        if let Some(prev) = previous {
            let count_delta = current.count.checked_sub(prev.count).unwrap_or(-1);
            let time_delta = current.time_ms.checked_sub(prev.time_ms).unwrap_or(-1);
            if count_delta >= 0 && time_delta >= 0 {
                return GcRate {
                    count_per_period: count_delta,
                    time_percent: (time_delta / period_secs) as f64 / 10.0,
                    mode: RateMode::Delta,
                };
            }
        }

        let uptime = uptime_ms.max(1);
        GcRate {
            count_per_period: current
                .count
                .max(0)
                .saturating_mul(period_secs)
                .saturating_mul(1000)
                / uptime,
            time_percent: (current.time_ms.max(0).saturating_mul(1000) / uptime) as f64 / 10.0,
            mode: RateMode::Bootstrap,
        }
    }

    /// Share of wall-clock time the process spent on CPU, over all cores.
    ///
    /// Without a usable previous reading the lifetime average is reported.
    /// A process that has not been up for a measurable time is
    /// [`CpuPercent::Unavailable`].
    ///
    /// # Examples
    ///
    /// ```
    /// use jmxmon_collector::rate::RateCalculator;
    /// use jmxmon_collector::state::CpuReading;
    /// use jmxmon_common::types::CpuPercent;
    ///
    /// // 2 s of CPU over 10 s on 4 cores.
    /// let prev = CpuReading { uptime_ms: 50_000, cpu_time_ns: 1_000_000_000 };
    /// let now = CpuReading { uptime_ms: 60_000, cpu_time_ns: 3_000_000_000 };
    /// assert_eq!(RateCalculator::cpu(now, Some(prev), 4), CpuPercent::Percent(5));
    /// ```
    pub fn cpu(current: CpuReading, previous: Option<CpuReading>, cores: i64) -> CpuPercent {
        if current.uptime_ms <= 0 {
            return CpuPercent::Unavailable;
        }
        let cores = cores.max(1);

        let deltas = previous.and_then(|prev| {
            let cpu_delta = current.cpu_time_ns.checked_sub(prev.cpu_time_ns)?;
            let uptime_delta = current.uptime_ms.checked_sub(prev.uptime_ms)?;
            (cpu_delta >= 0 && uptime_delta > 0).then_some((cpu_delta, uptime_delta))
        });
        let (cpu_delta, uptime_delta) =
            deltas.unwrap_or((current.cpu_time_ns.max(0), current.uptime_ms));

        let percent = cpu_delta / uptime_delta.saturating_mul(cores).saturating_mul(10_000);
        CpuPercent::Percent(percent.clamp(0, CPU_PERCENT_CAP) as u8)
    }

    /// Per-second rate of a custom counter.
    ///
    /// The delta form divides by `period * 6` and the bootstrap form by the
    /// uptime in units of 10 s, both yielding tenths. A value that shrank or
    /// an uptime that went backwards since `previous` means a restart.
    ///
    /// # Examples
    ///
    /// ```
    /// use jmxmon_collector::rate::RateCalculator;
    /// use jmxmon_collector::state::ValueReading;
    /// use jmxmon_common::types::{Period, RateMode};
    ///
    /// let prev = ValueReading { value: 400, uptime_ms: 110_000 };
    /// let now = ValueReading { value: 1_600, uptime_ms: 120_000 };
    /// let rate = RateCalculator::attribute(now, Some(prev), Period::from_secs(10));
    /// assert_eq!(rate.mode, RateMode::Delta);
    /// assert_eq!(rate.tenths, 20);
    /// assert_eq!(rate.display(), "2.0");
    /// ```
    pub fn attribute(
        current: ValueReading,
        previous: Option<ValueReading>,
        period: Period,
    ) -> AttributeRate {
        let delta = previous
            .filter(|prev| current.uptime_ms >= prev.uptime_ms)
            .and_then(|prev| current.value.checked_sub(prev.value))
            .filter(|delta| *delta >= 0);
        if let Some(delta) = delta {
            return AttributeRate {
                tenths: delta / period.secs() / 6,
                mode: RateMode::Delta,
            };
        }
        AttributeRate {
            tenths: current.value.saturating_mul(10_000) / current.uptime_ms.max(1),
            mode: RateMode::Bootstrap,
        }
    }
}
