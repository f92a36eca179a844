use crate::shared::{
    MaxScaleConnectionConfig, MaxScaleConnectionConfigWithoutSecrets, SentryConfig,
    ValidationError,
};

/// Complete configuration for the `cdc-print` service.
///
/// Holds secrets, log [`PrinterConfigWithoutSecrets`] instead.
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// Connection to the CDC listener records are read from.
    pub source: MaxScaleConnectionConfig,
    /// Capacity of the queue between the source and the sink.
    ///
    /// When `None`, the capacity is sized to the available parallelism of the host.
    pub queue_capacity: Option<usize>,
    /// Optional Sentry configuration for error tracking.
    ///
    /// If `None`, failures are only logged.
    pub sentry: Option<SentryConfig>,
}

impl PrinterConfig {
    /// Validates the complete configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;

        if self.queue_capacity == Some(0) {
            return Err(ValidationError::QueueCapacityZero);
        }

        Ok(())
    }
}

/// Same as [`PrinterConfig`] but without secrets.
#[derive(Debug, Clone)]
pub struct PrinterConfigWithoutSecrets {
    pub source: MaxScaleConnectionConfigWithoutSecrets,
    pub queue_capacity: Option<usize>,
    pub sentry_enabled: bool,
}

impl From<PrinterConfig> for PrinterConfigWithoutSecrets {
    fn from(value: PrinterConfig) -> Self {
        PrinterConfigWithoutSecrets {
            source: value.source.into(),
            queue_capacity: value.queue_capacity,
            sentry_enabled: value.sentry.is_some(),
        }
    }
}
