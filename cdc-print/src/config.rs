use cdc_config::shared::{
    CdcFormat, DEFAULT_CDC_PORT, MaxScaleConnectionConfig, PrinterConfig, SentryConfig,
};
use clap::Parser;
use secrecy::SecretString;

use crate::error::{PrinterError, PrinterResult};

/// Prints the change stream of a MariaDB table, read from a MaxScale CDC listener, to stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host of the CDC listener.
    #[arg(long = "cdc-host", env = "CDC_HOST")]
    host: String,

    /// Port of the CDC listener.
    #[arg(long = "cdc-port", env = "CDC_PORT", default_value_t = DEFAULT_CDC_PORT)]
    port: u16,

    /// User of the CDC listener.
    #[arg(long = "cdc-user", env = "CDC_USER")]
    user: String,

    /// Password of the CDC user.
    #[arg(long = "cdc-password", env = "CDC_PASSWORD", hide_env_values = true)]
    password: String,

    /// Database of the streamed table.
    #[arg(long = "cdc-database", env = "CDC_DATABASE")]
    database: String,

    /// Streamed table.
    #[arg(long = "cdc-table", env = "CDC_TABLE")]
    table: String,

    /// UUID the client registers with. A random one is used when omitted.
    #[arg(long = "cdc-uuid", env = "CDC_UUID")]
    uuid: Option<String>,

    /// Format of the records, either `JSON` or `AVRO`.
    #[arg(long = "cdc-format", env = "CDC_FORMAT", default_value = "JSON")]
    format: CdcFormat,

    /// GTID to start streaming from.
    #[arg(long = "cdc-gtid", env = "CDC_GTID")]
    gtid: Option<String>,

    /// Sentry DSN. Failures are only logged when omitted.
    #[arg(long = "sentry-dsn", env = "SENTRY_DSN", hide_env_values = true)]
    sentry_dsn: Option<String>,

    /// Capacity of the queue between the source and stdout.
    #[arg(long = "queue-capacity", env = "QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,
}

impl From<Args> for PrinterConfig {
    fn from(args: Args) -> Self {
        PrinterConfig {
            source: MaxScaleConnectionConfig {
                host: args.host,
                port: args.port,
                username: args.user,
                password: SecretString::new(args.password),
                database: args.database,
                table: args.table,
                uuid: args.uuid.filter(|uuid| !uuid.is_empty()),
                format: args.format,
                gtid: args.gtid.filter(|gtid| !gtid.is_empty()),
            },
            queue_capacity: args.queue_capacity,
            sentry: args
                .sentry_dsn
                .filter(|dsn| !dsn.is_empty())
                .map(|dsn| SentryConfig {
                    dsn: SecretString::new(dsn),
                }),
        }
    }
}

/// Loads the printer configuration from the command line and the environment, and validates it.
pub fn load_printer_config() -> PrinterResult<PrinterConfig> {
    let config = PrinterConfig::from(Args::parse());
    config.validate().map_err(PrinterError::config)?;

    Ok(config)
}
