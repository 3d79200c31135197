/// Why a target's sampling pass was aborted.
///
/// Every variant is scoped to one target: the sampler clears that target's
/// rate state and the scheduler moves on to the next target.
///
/// # Examples
///
/// ```rust
/// use jmxmon_collector::error::SampleError;
///
/// let err = SampleError::Connect("connection refused".to_string());
/// assert!(err.to_string().contains("refused"));
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    /// The remote process could not be reached.
    #[error("Sample: cannot connect: {0}")]
    Connect(String),

    /// The remote process rejected the credentials.
    #[error("Sample: authentication failed: {0}")]
    Auth(String),

    /// A request failed after the connection was established.
    #[error("Sample: transport error: {0}")]
    Transport(String),

    /// A value had a different shape than the metric requires.
    #[error("Sample: unexpected value for {what}: found {found}")]
    UnexpectedValue { what: String, found: String },

    /// A segment of an attribute path does not exist in the remote value.
    #[error("Sample: attribute path '{path}' does not resolve at '{segment}' ({found})")]
    PathUnresolved {
        path: String,
        segment: String,
        found: &'static str,
    },

    /// The remote side rejected an object name pattern.
    #[error("Sample: invalid object name pattern '{0}'")]
    InvalidPattern(String),
}

/// Convenience `Result` alias for sampling operations.
pub type Result<T> = std::result::Result<T, SampleError>;
