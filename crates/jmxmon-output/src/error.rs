use std::path::PathBuf;

/// Errors raised by output writers.
///
/// A failing writer never stops the pass: the manager logs the error and
/// moves on to the next writer.
///
/// # Examples
///
/// ```rust
/// use jmxmon_output::error::OutputError;
///
/// let err = OutputError::Io {
///     path: "jmxmon.csv".into(),
///     source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
/// };
/// assert!(err.to_string().contains("jmxmon.csv"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Opening or writing an output file failed.
    #[error("Output: cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the console stream failed.
    #[error("Output: console write failed: {0}")]
    Console(#[source] std::io::Error),
}

/// Convenience `Result` alias for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Attaches the file path to an I/O error.
pub(crate) trait IoContext<T> {
    fn at(self, path: &std::path::Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
