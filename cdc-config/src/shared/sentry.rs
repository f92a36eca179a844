use secrecy::SecretString;

/// Sentry error tracking configuration.
///
/// Contains the DSN required to initialize Sentry for reporting pipeline failures.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN (Data Source Name) for error reporting.
    pub dsn: SecretString,
}
