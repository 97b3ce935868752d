use thiserror::Error;

/// Configuration errors are the one place the core fails fast: everything
/// downstream of a valid config is normal control flow (null signals,
/// risk violations, tag lists), never a panic or an unwound error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("unknown enum value for {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
}
