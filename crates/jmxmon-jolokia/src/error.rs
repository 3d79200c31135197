use jmxmon_collector::error::SampleError;

/// Errors of the Jolokia HTTP bridge.
///
/// # Examples
///
/// ```rust
/// use jmxmon_collector::error::SampleError;
/// use jmxmon_jolokia::error::JolokiaError;
///
/// let err = JolokiaError::Unauthorized { status: 401 };
/// assert!(matches!(SampleError::from(err), SampleError::Auth(_)));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum JolokiaError {
    /// The HTTP client could not be built from the configuration.
    #[error("Jolokia: invalid client configuration: {0}")]
    InvalidConfig(String),

    /// An underlying HTTP transport error from `reqwest`.
    #[error("Jolokia: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body is not valid Jolokia JSON.
    #[error("Jolokia: malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// The agent rejected the credentials.
    #[error("Jolokia: unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The HTTP exchange itself failed.
    #[error("Jolokia: HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The agent processed the request and reported an error.
    #[error("Jolokia: remote error {status} ({error_type}): {message}")]
    Remote {
        status: u16,
        error_type: String,
        message: String,
    },
}

/// Convenience `Result` alias for Jolokia operations.
pub type Result<T> = std::result::Result<T, JolokiaError>;

impl From<JolokiaError> for SampleError {
    fn from(err: JolokiaError) -> Self {
        match &err {
            JolokiaError::Unauthorized { .. } => SampleError::Auth(err.to_string()),
            JolokiaError::Http(e) if e.is_connect() || e.is_timeout() => {
                SampleError::Connect(err.to_string())
            }
            JolokiaError::Remote { error_type, .. } if error_type.ends_with("MalformedObjectNameException") => {
                SampleError::InvalidPattern(err.to_string())
            }
            _ => SampleError::Transport(err.to_string()),
        }
    }
}
