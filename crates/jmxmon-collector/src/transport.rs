use crate::error::Result;
use async_trait::async_trait;
use jmxmon_common::remote::RemoteValue;
use jmxmon_common::spec::MethodParam;
use jmxmon_common::types::Target;

/// Object name of the runtime bean carrying the process uptime.
pub const RUNTIME_OBJECT: &str = "java.lang:type=Runtime";

/// Opens management connections to remote processes.
///
/// Implementations must bound every blocking call with a timeout: the
/// sampler enforces none itself, so a hanging call stalls the whole pass.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short transport name used in logs.
    fn name(&self) -> &str;

    /// Connects to `target` with its credentials, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::Connect`](crate::error::SampleError::Connect) or
    /// [`SampleError::Auth`](crate::error::SampleError::Auth) when the target
    /// cannot be used.
    async fn connect(&self, target: &Target) -> Result<Box<dyn Connection>>;
}

/// One open session with a remote process, used for a single pass.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Reads one attribute of one object.
    async fn read_attribute(&self, object: &str, attribute: &str) -> Result<RemoteValue>;

    /// Invokes an operation with already-typed arguments.
    async fn invoke(&self, object: &str, method: &str, params: &[MethodParam]) -> Result<RemoteValue>;

    /// Lists the object names matching `pattern`. No match is an empty list.
    async fn query_names(&self, pattern: &str) -> Result<Vec<String>>;

    /// Process uptime in milliseconds.
    async fn uptime_ms(&self) -> Result<i64> {
        let value = self.read_attribute(RUNTIME_OBJECT, "Uptime").await?;
        value
            .as_counter()
            .ok_or_else(|| crate::error::SampleError::UnexpectedValue {
                what: "Uptime".to_string(),
                found: value.kind().to_string(),
            })
    }

    /// Releases the session. Errors are not reported.
    async fn close(&self);
}
