use std::env::VarError;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Variable selecting the deployment the process runs in.
pub const APP_ENVIRONMENT_ENV_NAME: &str = "APP_ENVIRONMENT";

/// Errors raised while resolving the [`Environment`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("`{0}` is not a supported environment, expected `dev` or `prod`")]
    Unsupported(String),

    #[error("`{APP_ENVIRONMENT_ENV_NAME}` is not valid unicode")]
    NotUnicode,
}

/// Deployment the process runs in.
///
/// Drives the log output format and the environment tag of reported errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl Environment {
    /// Reads the environment from `APP_ENVIRONMENT`, falling back to [`Environment::Dev`] when it
    /// is unset.
    pub fn load() -> Result<Self, EnvironmentError> {
        Self::from_var(std::env::var(APP_ENVIRONMENT_ENV_NAME))
    }

    fn from_var(value: Result<String, VarError>) -> Result<Self, EnvironmentError> {
        match value {
            Ok(value) => value.parse(),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(_)) => Err(EnvironmentError::NotUnicode),
        }
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Environment::Prod)
    }
}

impl FromStr for Environment {
    type Err = EnvironmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("dev") {
            Ok(Environment::Dev)
        } else if value.eq_ignore_ascii_case("prod") {
            Ok(Environment::Prod)
        } else {
            Err(EnvironmentError::Unsupported(value.to_string()))
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Dev => f.write_str("dev"),
            Environment::Prod => f.write_str("prod"),
        }
    }
}
