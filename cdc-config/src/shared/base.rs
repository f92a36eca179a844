use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required string setting was empty.
    #[error("`{0}` cannot be empty")]
    EmptyValue(&'static str),
    /// The CDC listener port cannot be zero.
    #[error("`port` cannot be zero")]
    PortZero,
    /// The record queue capacity cannot be zero.
    #[error("`queue_capacity` cannot be zero")]
    QueueCapacityZero,
}
