use crate::error::SampleError;
use crate::mock::{Fault, MockProcess, MockTransport};
use crate::state::{CounterReading, MetricKey, RateState, Reading};
use crate::TargetSampler;
use jmxmon_common::remote::RemoteValue;
use jmxmon_common::spec::{AttributeSpec, MethodParam, ParamValue};
use jmxmon_common::types::{
    CpuPercent, ObservationValue, Period, RateMode, Target, TargetOutcome, TargetSample,
};
use std::collections::BTreeMap;
use std::sync::Arc;

const ADDR: &str = "app1:9010";

fn process() -> MockProcess {
    MockProcess::new(600_000)
        .with_collector("PS Scavenge", 120, 6_000)
        .with_collector("PS MarkSweep", 6, 3_000)
        .with_cpu(60_000_000_000, 2)
        .with_attribute(
            "java.lang:type=Threading",
            "ThreadCount",
            RemoteValue::Integer(42),
        )
}

fn setup() -> (MockTransport, TargetSampler, Target) {
    let transport = MockTransport::new();
    transport.insert(ADDR, process());
    let sampler = TargetSampler::new(Arc::new(transport.clone()));
    (transport, sampler, Target::new(ADDR, Some("shop"), None))
}

fn specs(records: &[&str]) -> Vec<AttributeSpec> {
    AttributeSpec::parse_all(records).unwrap()
}

fn sampled(outcome: TargetOutcome) -> TargetSample {
    match outcome {
        TargetOutcome::Sampled(sample) => sample,
        TargetOutcome::Failed { failure, .. } => panic!("unexpected failure: {}", failure.cause),
    }
}

fn advance(transport: &MockTransport) {
    transport.update(ADDR, |p| {
        p.set_uptime(610_000);
        p.set_collector("PS Scavenge", 125, 6_500);
        p.set_collector("PS MarkSweep", 6, 3_000);
        p.set_cpu_time(64_000_000_000);
    });
}

#[tokio::test]
async fn first_pass_bootstraps_then_deltas() {
    let (transport, sampler, target) = setup();
    let mut state = RateState::new();
    let period = Period::from_secs(10);

    let first = sampled(sampler.sample(&target, &mut state, &[], period).await);
    let names: Vec<&str> = first.gc.collectors.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["PS MarkSweep", "PS Scavenge"]);
    assert!(first.gc.collectors.iter().all(|c| c.mode == RateMode::Bootstrap));
    assert_eq!(first.gc.collectors[1].count_per_period, 2);
    assert_eq!(first.gc.collectors[1].time_percent, 1.0);
    assert_eq!(first.gc.time_percent_sum, 1.5);
    assert_eq!(first.gc.cpu, CpuPercent::Percent(5));

    advance(&transport);
    let second = sampled(sampler.sample(&target, &mut state, &[], period).await);
    assert!(second.gc.collectors.iter().all(|c| c.mode == RateMode::Delta));
    assert_eq!(second.gc.collectors[1].count_per_period, 5);
    assert_eq!(second.gc.collectors[1].time_percent, 5.0);
    assert_eq!(second.gc.collectors[0].count_per_period, 0);
    assert_eq!(second.gc.cpu, CpuPercent::Percent(20));
    assert_eq!(transport.connects(ADDR), 2);
    assert_eq!(transport.closes(ADDR), 2);
}

#[tokio::test]
async fn restarted_process_never_reports_negative_rates() {
    let (transport, sampler, target) = setup();
    let mut state = RateState::new();
    let period = Period::from_secs(10);
    sampled(sampler.sample(&target, &mut state, &[], period).await);

    transport.update(ADDR, |p| {
        p.set_uptime(20_000);
        p.set_collector("PS Scavenge", 4, 100);
        p.set_cpu_time(2_000_000_000);
    });
    let after = sampled(sampler.sample(&target, &mut state, &[], period).await);
    let scavenge = &after.gc.collectors[1];
    assert_eq!(scavenge.mode, RateMode::Bootstrap);
    assert_eq!(scavenge.count_per_period, 2);
    assert_eq!(scavenge.time_percent, 0.5);
    assert_eq!(after.gc.cpu, CpuPercent::Percent(5));
}

#[tokio::test]
async fn normalized_name_is_a_fresh_key() {
    let transport = MockTransport::new();
    transport.insert(
        ADDR,
        MockProcess::new(100_000).with_collector("ConcurrentMarkSweep Young Generation", 10, 100),
    );
    let sampler = TargetSampler::new(Arc::new(transport));
    let target = Target::new(ADDR, None, None);

    let mut state = RateState::new();
    state.replace(
        MetricKey::Gc("ConcurrentMarkSweep Young Generation".into()),
        Reading::Counters(CounterReading { count: 0, time_ms: 0 }),
    );
    let sample = sampled(
        sampler
            .sample(&target, &mut state, &[], Period::from_secs(10))
            .await,
    );
    assert_eq!(sample.gc.collectors[0].name, "Young Generation");
    assert_eq!(sample.gc.collectors[0].mode, RateMode::Bootstrap);
}

#[tokio::test]
async fn missing_cpu_attribute_is_unavailable_not_a_failure() {
    let transport = MockTransport::new();
    transport.insert(ADDR, MockProcess::new(1_000).with_collector("G1 Old Generation", 0, 0));
    let sampler = TargetSampler::new(Arc::new(transport));
    let mut state = RateState::new();

    let sample = sampled(
        sampler
            .sample(&Target::new(ADDR, None, None), &mut state, &[], Period::from_secs(5))
            .await,
    );
    assert_eq!(sample.gc.cpu, CpuPercent::Unavailable);
    assert_eq!(state.cpu(), None);
}

#[tokio::test]
async fn unmatched_pattern_yields_one_unresolved_observation() {
    let (_transport, sampler, target) = setup();
    let mut state = RateState::new();
    let specs = specs(&[
        "; Sessions; activeSessions; Catalina:type=Manager,*",
        "; Threads; ThreadCount; java.lang:type=Threading",
    ]);

    let sample = sampled(
        sampler
            .sample(&target, &mut state, &specs, Period::from_secs(10))
            .await,
    );
    assert_eq!(sample.attributes.len(), 2);
    assert_eq!(sample.attributes[0].title, "Sessions");
    assert_eq!(sample.attributes[0].value, ObservationValue::Unresolved);
    assert_eq!(
        sample.attributes[0].key,
        "activeSessions::Catalina:type=Manager,*"
    );
    assert_eq!(sample.attributes[1].value, ObservationValue::Value("42".into()));
    assert_eq!(sample.attributes[1].target, "shop-app1:9010");
}

#[tokio::test]
async fn pattern_expands_to_every_instance() {
    let (transport, sampler, target) = setup();
    for (pool, used) in [("Eden Space", 10), ("Old Gen", 20)] {
        let mut usage = BTreeMap::new();
        usage.insert("used".to_string(), RemoteValue::Integer(used));
        let object = format!("java.lang:type=MemoryPool,name={pool}");
        transport.update(ADDR, |p| {
            p.set_attribute(&object, "Usage", RemoteValue::Composite(usage))
        });
    }
    let mut state = RateState::new();
    let specs = specs(&["; Pool used; Usage.used; java.lang:type=MemoryPool,*"]);

    let sample = sampled(
        sampler
            .sample(&target, &mut state, &specs, Period::from_secs(10))
            .await,
    );
    let values: Vec<String> = sample.attributes.iter().map(|o| o.value.to_string()).collect();
    assert_eq!(values, ["10", "20"]);
    assert_eq!(
        sample.attributes[1].key,
        "Usage.used::java.lang:type=MemoryPool,name=Old Gen"
    );
}

#[tokio::test]
async fn invoke_passes_typed_params() {
    let (transport, sampler, target) = setup();
    transport.update(ADDR, |p| {
        *p = p.clone().with_operation(
            "java.lang:type=Threading",
            "getThreadCpuTime",
            RemoteValue::Integer(7_000),
        )
    });
    let mut state = RateState::new();
    let specs = specs(&["; T1 cpu; invoke; java.lang:type=Threading; getThreadCpuTime; long; 1"]);

    let sample = sampled(
        sampler
            .sample(&target, &mut state, &specs, Period::from_secs(10))
            .await,
    );
    assert_eq!(sample.attributes[0].value, ObservationValue::Value("7000".into()));
    let calls = transport.invocations();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].params,
        vec![MethodParam {
            signature: "long".into(),
            value: ParamValue::Int(1)
        }]
    );
}

#[tokio::test]
async fn rate_attribute_bootstraps_then_deltas() {
    let (transport, sampler, target) = setup();
    transport.update(ADDR, |p| {
        p.set_attribute(
            "Catalina:type=GlobalRequestProcessor,name=http",
            "requestCount",
            RemoteValue::Integer(6_000),
        )
    });
    let mut state = RateState::new();
    let period = Period::from_secs(10);
    let specs = specs(&["diff; Requests; requestCount; Catalina:type=GlobalRequestProcessor,*"]);

    let first = sampled(sampler.sample(&target, &mut state, &specs, period).await);
    // 6000 * 10000 / 600000 = 100 tenths
    assert_eq!(first.attributes[0].value, ObservationValue::Value("10.0".into()));

    transport.update(ADDR, |p| {
        p.set_attribute(
            "Catalina:type=GlobalRequestProcessor,name=http",
            "requestCount",
            RemoteValue::Integer(6_600),
        )
    });
    let second = sampled(sampler.sample(&target, &mut state, &specs, period).await);
    assert_eq!(second.attributes[0].value, ObservationValue::Value("1.0".into()));
}

#[tokio::test]
async fn rate_attribute_restart_with_higher_counter_bootstraps() {
    let (transport, sampler, target) = setup();
    let object = "Catalina:type=GlobalRequestProcessor,name=http";
    transport.update(ADDR, |p| {
        p.set_attribute(object, "requestCount", RemoteValue::Integer(1_000))
    });
    let mut state = RateState::new();
    let period = Period::from_secs(10);
    let specs = specs(&["diff; Requests; requestCount; Catalina:type=GlobalRequestProcessor,*"]);
    sampled(sampler.sample(&target, &mut state, &specs, period).await);

    // Restarted and already busier than before: the counter grew but the
    // uptime went back to 10 s.
    transport.update(ADDR, |p| {
        p.set_uptime(10_000);
        p.set_attribute(object, "requestCount", RemoteValue::Integer(2_000));
    });
    let second = sampled(sampler.sample(&target, &mut state, &specs, period).await);
    // 2000 * 10000 / 10000 = 2000 tenths
    assert_eq!(second.attributes[0].value, ObservationValue::Value("200.0".into()));
}

#[tokio::test]
async fn failure_clears_state_and_emits_only_placeholders() {
    let (transport, sampler, target) = setup();
    let mut state = RateState::new();
    let period = Period::from_secs(10);
    let specs = specs(&["; Threads; ThreadCount; java.lang:type=Threading"]);
    sampled(sampler.sample(&target, &mut state, &specs, period).await);
    assert!(!state.is_empty());

    transport.set_fault(ADDR, Some(Fault::Unreachable));
    match sampler.sample(&target, &mut state, &specs, period).await {
        TargetOutcome::Failed {
            failure,
            placeholders,
        } => {
            assert_eq!(failure.address, ADDR);
            assert!(failure.cause.contains("connection refused"));
            assert_eq!(placeholders.len(), 1);
            assert_eq!(placeholders[0].value, ObservationValue::Unresolved);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(state.is_empty());

    transport.set_fault(ADDR, None);
    advance(&transport);
    let recovered = sampled(sampler.sample(&target, &mut state, &specs, period).await);
    assert!(recovered
        .gc
        .collectors
        .iter()
        .all(|c| c.mode == RateMode::Bootstrap));
}

#[tokio::test]
async fn broken_connection_still_closes() {
    let (transport, sampler, target) = setup();
    transport.set_fault(ADDR, Some(Fault::BrokenReads));
    let mut state = RateState::new();

    let outcome = sampler
        .sample(&target, &mut state, &[], Period::from_secs(10))
        .await;
    assert!(matches!(outcome, TargetOutcome::Failed { .. }));
    assert_eq!(transport.closes(ADDR), 1);
}

#[tokio::test]
async fn unresolvable_path_fails_the_target() {
    let (_transport, sampler, target) = setup();
    let mut state = RateState::new();
    let specs = specs(&["; Bad; ThreadCount.used; java.lang:type=Threading"]);

    match sampler
        .sample(&target, &mut state, &specs, Period::from_secs(10))
        .await
    {
        TargetOutcome::Failed { failure, .. } => {
            let expected = SampleError::PathUnresolved {
                path: "ThreadCount.used".into(),
                segment: "used".into(),
                found: "integer",
            };
            assert_eq!(failure.cause, expected.to_string());
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn auth_rejection_is_reported() {
    let (transport, sampler, target) = setup();
    transport.set_fault(ADDR, Some(Fault::AuthRejected));
    let mut state = RateState::new();

    let outcome = sampler
        .sample(&target, &mut state, &[], Period::from_secs(10))
        .await;
    let failure = match outcome {
        TargetOutcome::Failed { failure, .. } => failure,
        other => panic!("expected failure, got {other:?}"),
    };
    assert!(failure.cause.contains("authentication failed"));
    assert_eq!(transport.closes(ADDR), 0);
}
