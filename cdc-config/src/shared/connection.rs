use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;

use crate::shared::ValidationError;

/// Default port of a MaxScale CDC listener.
pub const DEFAULT_CDC_PORT: u16 = 4001;

/// Output format requested from the CDC listener when registering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CdcFormat {
    /// Newline-delimited JSON records.
    #[default]
    Json,
    /// Avro encoded records.
    Avro,
}

impl CdcFormat {
    /// Returns the name of the format as understood by the `REGISTER` command.
    pub fn as_str(&self) -> &'static str {
        match self {
            CdcFormat::Json => "JSON",
            CdcFormat::Avro => "AVRO",
        }
    }
}

impl fmt::Display for CdcFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CdcFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "JSON" => Ok(CdcFormat::Json),
            "AVRO" => Ok(CdcFormat::Avro),
            other => Err(format!(
                "{other} is not a supported cdc format. Use either `JSON` or `AVRO`."
            )),
        }
    }
}

/// Connection settings for a MaxScale CDC listener.
#[derive(Debug, Clone)]
pub struct MaxScaleConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Database of the table to stream.
    pub database: String,
    /// Table to stream.
    pub table: String,
    /// Client identifier sent in the `REGISTER` command.
    ///
    /// When `None`, a random identifier is generated per connection.
    pub uuid: Option<String>,
    pub format: CdcFormat,
    /// GTID to start streaming from. When `None`, streaming starts from the first available event.
    pub gtid: Option<String>,
}

impl MaxScaleConnectionConfig {
    /// Returns the `host:port` address of the listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the fully qualified `database.table` name requested from the listener.
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::EmptyValue("host"));
        }

        if self.port == 0 {
            return Err(ValidationError::PortZero);
        }

        if self.username.is_empty() {
            return Err(ValidationError::EmptyValue("username"));
        }

        if self.database.is_empty() {
            return Err(ValidationError::EmptyValue("database"));
        }

        if self.table.is_empty() {
            return Err(ValidationError::EmptyValue("table"));
        }

        Ok(())
    }
}

/// Same as [`MaxScaleConnectionConfig`] but without secrets, so it is safe to log.
#[derive(Debug, Clone)]
pub struct MaxScaleConnectionConfigWithoutSecrets {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub database: String,
    pub table: String,
    pub uuid: Option<String>,
    pub format: CdcFormat,
    pub gtid: Option<String>,
}

impl From<MaxScaleConnectionConfig> for MaxScaleConnectionConfigWithoutSecrets {
    fn from(value: MaxScaleConnectionConfig) -> Self {
        MaxScaleConnectionConfigWithoutSecrets {
            host: value.host,
            port: value.port,
            username: value.username,
            database: value.database,
            table: value.table,
            uuid: value.uuid,
            format: value.format,
            gtid: value.gtid,
        }
    }
}
