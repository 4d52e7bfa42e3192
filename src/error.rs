use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The storage backend could not complete the operation.
    #[error("adapter unavailable: {0}")]
    AdapterUnavailable(String),
    /// An adapter handed back a gate value outside the storage contract.
    #[error("malformed {gate} value in adapter snapshot: {value:?}")]
    MalformedValue { gate: &'static str, value: String },
    #[error("percentage must be between 0 and 100, got {0}")]
    InvalidPercentage(i64),
    #[error("feature name must not be empty")]
    EmptyFeatureName,
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
