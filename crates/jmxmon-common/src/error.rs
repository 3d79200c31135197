/// Errors raised while turning configuration text into targets and
/// attribute specifications. Always fatal at startup.
///
/// # Examples
///
/// ```rust
/// use jmxmon_common::error::SpecError;
///
/// let err = SpecError::UnknownParamType("java.util.Date".to_string());
/// assert!(err.to_string().contains("java.util.Date"));
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpecError {
    /// No target address was configured.
    #[error("Config: no target address configured")]
    MissingAddress,

    /// A per-target list does not pair up with the address list.
    #[error("Config: '{field}' lists {found} entries but {expected} addresses are configured")]
    CardinalityMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// An attribute record has fewer than the four mandatory fields.
    #[error("Config: attribute record '{0}' needs at least mode; title; attribute; object pattern")]
    TooFewFields(String),

    /// A mandatory attribute field is blank.
    #[error("Config: attribute record '{record}' has an empty {field}")]
    EmptyField { record: String, field: &'static str },

    /// `invoke` was requested without naming the operation.
    #[error("Config: attribute record '{0}' uses invoke but names no method")]
    MissingMethod(String),

    /// Method parameters must come as (type, value) pairs.
    #[error("Config: method parameters of '{0}' are not (type, value) pairs")]
    UnpairedParams(String),

    /// The declared parameter type is not supported.
    #[error("Config: unsupported parameter type '{0}'")]
    UnknownParamType(String),

    /// The literal cannot be converted to the declared type.
    #[error("Config: '{literal}' is not a valid {type_name}")]
    InvalidParamValue { type_name: String, literal: String },
}

/// Convenience `Result` alias for specification parsing.
pub type Result<T> = std::result::Result<T, SpecError>;
