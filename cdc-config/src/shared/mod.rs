//! Shared configuration types for cdc pipelines.

mod base;
mod connection;
mod printer;
mod sentry;

pub use base::ValidationError;
pub use connection::{
    CdcFormat, DEFAULT_CDC_PORT, MaxScaleConnectionConfig, MaxScaleConnectionConfigWithoutSecrets,
};
pub use printer::{PrinterConfig, PrinterConfigWithoutSecrets};
pub use sentry::SentryConfig;
