//! In-memory transport for tests and demos.
//!
//! A [`MockTransport`] serves fake processes keyed by address. Tests keep a
//! clone of the transport and mutate the processes between passes to
//! simulate counter growth, restarts and outages.

use crate::error::{Result, SampleError};
use crate::transport::{Connection, Transport, RUNTIME_OBJECT};
use async_trait::async_trait;
use jmxmon_common::remote::RemoteValue;
use jmxmon_common::spec::MethodParam;
use jmxmon_common::types::Target;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

/// How a fake process misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Connecting fails.
    Unreachable,
    /// Connecting fails with rejected credentials.
    AuthRejected,
    /// Connecting works, every later request fails.
    BrokenReads,
}

/// A fake remote process: named objects with attributes and operations.
#[derive(Debug, Clone, Default)]
pub struct MockProcess {
    objects: BTreeMap<String, BTreeMap<String, RemoteValue>>,
    operations: BTreeMap<(String, String), RemoteValue>,
    fault: Option<Fault>,
}

impl MockProcess {
    pub fn new(uptime_ms: i64) -> Self {
        Self::default().with_attribute(RUNTIME_OBJECT, "Uptime", RemoteValue::Integer(uptime_ms))
    }

    pub fn with_attribute(mut self, object: &str, attribute: &str, value: RemoteValue) -> Self {
        self.set_attribute(object, attribute, value);
        self
    }

    pub fn with_operation(mut self, object: &str, method: &str, result: RemoteValue) -> Self {
        self.objects.entry(object.to_string()).or_default();
        self.operations
            .insert((object.to_string(), method.to_string()), result);
        self
    }

    /// Adds a garbage collector bean named `name`.
    pub fn with_collector(mut self, name: &str, count: i64, time_ms: i64) -> Self {
        self.set_collector(name, count, time_ms);
        self
    }

    pub fn with_cpu(mut self, cpu_time_ns: i64, cores: i64) -> Self {
        self.set_cpu_time(cpu_time_ns);
        self.set_attribute(
            "java.lang:type=OperatingSystem",
            "AvailableProcessors",
            RemoteValue::Integer(cores),
        );
        self
    }

    pub fn set_attribute(&mut self, object: &str, attribute: &str, value: RemoteValue) {
        self.objects
            .entry(object.to_string())
            .or_default()
            .insert(attribute.to_string(), value);
    }

    pub fn set_uptime(&mut self, uptime_ms: i64) {
        self.set_attribute(RUNTIME_OBJECT, "Uptime", RemoteValue::Integer(uptime_ms));
    }

    pub fn set_collector(&mut self, name: &str, count: i64, time_ms: i64) {
        let object = format!("java.lang:type=GarbageCollector,name={name}");
        self.set_attribute(&object, "Name", RemoteValue::Text(name.to_string()));
        self.set_attribute(&object, "CollectionCount", RemoteValue::Integer(count));
        self.set_attribute(&object, "CollectionTime", RemoteValue::Integer(time_ms));
    }

    pub fn set_cpu_time(&mut self, cpu_time_ns: i64) {
        self.set_attribute(
            "java.lang:type=OperatingSystem",
            "ProcessCpuTime",
            RemoteValue::Integer(cpu_time_ns),
        );
    }

    pub fn remove_object(&mut self, object: &str) {
        self.objects.remove(object);
    }

    fn matching(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = ObjectPattern::parse(pattern)?;
        Ok(self
            .objects
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect())
    }
}

/// One recorded operation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub address: String,
    pub object: String,
    pub method: String,
    pub params: Vec<MethodParam>,
}

#[derive(Debug, Default)]
struct Shared {
    processes: HashMap<String, MockProcess>,
    connects: HashMap<String, usize>,
    closes: HashMap<String, usize>,
    invocations: Vec<Invocation>,
}

/// Transport over in-memory [`MockProcess`]es. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    shared: Arc<Mutex<Shared>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, address: &str, process: MockProcess) {
        self.lock().processes.insert(address.to_string(), process);
    }

    /// Mutates the process at `address`, if there is one.
    pub fn update(&self, address: &str, f: impl FnOnce(&mut MockProcess)) {
        if let Some(process) = self.lock().processes.get_mut(address) {
            f(process);
        }
    }

    pub fn set_fault(&self, address: &str, fault: Option<Fault>) {
        self.update(address, |p| p.fault = fault);
    }

    pub fn connects(&self, address: &str) -> usize {
        self.lock().connects.get(address).copied().unwrap_or(0)
    }

    pub fn closes(&self, address: &str) -> usize {
        self.lock().closes.get(address).copied().unwrap_or(0)
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().invocations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self, target: &Target) -> Result<Box<dyn Connection>> {
        let fault = {
            let mut shared = self.lock();
            *shared.connects.entry(target.address.clone()).or_default() += 1;
            match shared.processes.get(&target.address) {
                Some(p) => p.fault,
                None => Some(Fault::Unreachable),
            }
        };
        match fault {
            Some(Fault::Unreachable) => Err(SampleError::Connect(format!(
                "{}: connection refused",
                target.address
            ))),
            Some(Fault::AuthRejected) => Err(SampleError::Auth(format!(
                "{}: invalid credentials",
                target.address
            ))),
            _ => Ok(Box::new(MockConnection {
                address: target.address.clone(),
                transport: self.clone(),
            })),
        }
    }
}

struct MockConnection {
    address: String,
    transport: MockTransport,
}

impl MockConnection {
    fn with_process<T>(&self, f: impl FnOnce(&MockProcess) -> Result<T>) -> Result<T> {
        let shared = self.transport.lock();
        match shared.processes.get(&self.address) {
            Some(p) if p.fault.is_none() => f(p),
            _ => Err(SampleError::Transport(format!(
                "{}: connection lost",
                self.address
            ))),
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn read_attribute(&self, object: &str, attribute: &str) -> Result<RemoteValue> {
        self.with_process(|p| {
            p.objects
                .get(object)
                .and_then(|attrs| attrs.get(attribute))
                .cloned()
                .ok_or_else(|| {
                    SampleError::Transport(format!("attribute {attribute} not found on {object}"))
                })
        })
    }

    async fn invoke(&self, object: &str, method: &str, params: &[MethodParam]) -> Result<RemoteValue> {
        let result = self.with_process(|p| {
            p.operations
                .get(&(object.to_string(), method.to_string()))
                .cloned()
                .ok_or_else(|| {
                    SampleError::Transport(format!("operation {method} not found on {object}"))
                })
        })?;
        self.transport.lock().invocations.push(Invocation {
            address: self.address.clone(),
            object: object.to_string(),
            method: method.to_string(),
            params: params.to_vec(),
        });
        Ok(result)
    }

    async fn query_names(&self, pattern: &str) -> Result<Vec<String>> {
        self.with_process(|p| p.matching(pattern))
    }

    async fn close(&self) {
        *self
            .transport
            .lock()
            .closes
            .entry(self.address.clone())
            .or_default() += 1;
    }
}

/// Object name pattern: `domain:key=value,...` with `*` and `?` wildcards
/// and a trailing `,*` admitting further properties.
struct ObjectPattern {
    domain: String,
    properties: Vec<(String, String)>,
    open: bool,
}

impl ObjectPattern {
    fn parse(pattern: &str) -> Result<Self> {
        let (domain, props) = pattern
            .trim()
            .split_once(':')
            .ok_or_else(|| SampleError::InvalidPattern(pattern.to_string()))?;
        let mut properties = Vec::new();
        let mut open = false;
        for prop in props.split(',').map(str::trim) {
            if prop == "*" {
                open = true;
                continue;
            }
            let (key, value) = prop
                .split_once('=')
                .ok_or_else(|| SampleError::InvalidPattern(pattern.to_string()))?;
            properties.push((key.to_string(), value.to_string()));
        }
        Ok(Self {
            domain: domain.to_string(),
            properties,
            open,
        })
    }

    fn matches(&self, name: &str) -> bool {
        let Some((domain, props)) = name.split_once(':') else {
            return false;
        };
        if !glob(&self.domain, domain) {
            return false;
        }
        let actual: Vec<(&str, &str)> = props
            .split(',')
            .filter_map(|p| p.split_once('='))
            .collect();
        if !self.open && actual.len() != self.properties.len() {
            return false;
        }
        self.properties.iter().all(|(key, value)| {
            actual
                .iter()
                .any(|(k, v)| k == key && glob(value, v))
        })
    }
}

fn glob(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}
