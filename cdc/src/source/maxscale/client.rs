use aws_lc_rs::digest;
use cdc_config::shared::CdcFormat;
use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info};

use crate::error::{CdcError, CdcResult, ErrorKind};
use crate::source::maxscale::hex::encode_hex;
use crate::types::Record;
use crate::{bail, cdc_error};

/// Reply sent by the listener when a command succeeded.
const OK_REPLY: &str = "OK";

/// Prefix of the replies sent by the listener when a command failed.
const ERR_REPLY_PREFIX: &str = "ERR";

/// Maximum length of a single line sent by the listener, terminator included.
const MAX_LINE_LENGTH: u64 = 16 * 1024 * 1024;

/// Builds the authentication message for `username` and `password`.
///
/// The listener expects the hex encoding of the user name, a colon, and the raw SHA-1 digest
/// of the password.
pub fn auth_message(username: &str, password: &str) -> String {
    let password_digest = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, password.as_bytes());

    let mut payload = Vec::with_capacity(username.len() + 1 + password_digest.as_ref().len());
    payload.extend_from_slice(username.as_bytes());
    payload.push(b':');
    payload.extend_from_slice(password_digest.as_ref());

    encode_hex(&payload)
}

/// Steps of the handshake, used to classify failed replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandshakeStep {
    Authenticate,
    Register,
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeStep::Authenticate => f.write_str("authentication"),
            HandshakeStep::Register => f.write_str("registration"),
        }
    }
}

/// Client performing the handshake with a MaxScale CDC listener.
///
/// The handshake is driven in order: [`MaxScaleClient::authenticate`],
/// [`MaxScaleClient::register`], and finally [`MaxScaleClient::request_data`], which consumes
/// the client and returns the stream of records.
#[derive(Debug)]
pub struct MaxScaleClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl MaxScaleClient {
    /// Opens a TCP connection to the listener at `address`.
    pub async fn connect(address: &str) -> CdcResult<Self> {
        let stream = TcpStream::connect(address).await.map_err(|err| {
            cdc_error!(
                ErrorKind::SourceConnectionFailed,
                "Failed to connect to the CDC listener",
                format!("Could not connect to {address}: {err}"),
                source: err
            )
        })?;
        stream.set_nodelay(true).map_err(source_io_error)?;

        info!(%address, "connected to cdc listener");

        let (reader, writer) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Authenticates as `username`.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> CdcResult<()> {
        self.send_command(&auth_message(username, password)).await?;
        self.expect_ok(HandshakeStep::Authenticate).await?;

        debug!(%username, "authenticated with cdc listener");

        Ok(())
    }

    /// Registers the client under `uuid`, requesting records in `format`.
    pub async fn register(&mut self, uuid: &str, format: CdcFormat) -> CdcResult<()> {
        self.send_command(&format!("REGISTER UUID={uuid}, TYPE={format}"))
            .await?;
        self.expect_ok(HandshakeStep::Register).await?;

        debug!(%uuid, %format, "registered with cdc listener");

        Ok(())
    }

    /// Requests the change stream of `table` (in `database.table` form), optionally starting
    /// at `gtid`.
    ///
    /// The first line sent back by the listener is inspected: an error reply fails the request,
    /// anything else is the first record of the stream.
    pub async fn request_data(mut self, table: &str, gtid: Option<&str>) -> CdcResult<MaxScaleStream> {
        let command = match gtid {
            Some(gtid) => format!("REQUEST-DATA {table} {gtid}"),
            None => format!("REQUEST-DATA {table}"),
        };
        self.send_command(&command).await?;

        let mut stream = MaxScaleStream {
            reader: self.reader,
            _writer: self.writer,
            pending: None,
        };

        if let Some(first) = stream.read_line().await? {
            if let Some(message) = error_message(&first) {
                bail!(
                    ErrorKind::SourceProtocolError,
                    "The CDC listener rejected the data request",
                    format!("Request for table {table} failed: {message}")
                );
            }

            stream.pending = Some(first);
        }

        info!(%table, gtid = gtid.unwrap_or("<none>"), "streaming records from cdc listener");

        Ok(stream)
    }

    async fn send_command(&mut self, command: &str) -> CdcResult<()> {
        self.writer
            .write_all(command.as_bytes())
            .await
            .map_err(source_io_error)?;
        self.writer.write_all(b"\n").await.map_err(source_io_error)?;
        self.writer.flush().await.map_err(source_io_error)?;

        Ok(())
    }

    async fn expect_ok(&mut self, step: HandshakeStep) -> CdcResult<()> {
        let Some(line) = read_line_limited(&mut self.reader, MAX_LINE_LENGTH).await? else {
            bail!(
                ErrorKind::SourceConnectionFailed,
                "The CDC listener closed the connection during the handshake",
                format!("Connection closed while waiting for the {step} reply")
            );
        };

        let line = String::from_utf8_lossy(&line);
        let reply = line.trim_end();
        if reply == OK_REPLY {
            return Ok(());
        }

        let kind = match step {
            HandshakeStep::Authenticate => ErrorKind::SourceAuthenticationFailed,
            HandshakeStep::Register => ErrorKind::SourceProtocolError,
        };

        match error_message(reply.as_bytes()) {
            Some(message) => bail!(
                kind,
                "The CDC listener rejected the handshake",
                format!("The {step} failed: {message}")
            ),
            None => bail!(
                ErrorKind::SourceProtocolError,
                "Unexpected reply from the CDC listener",
                format!("Expected `{OK_REPLY}` after {step}, got `{reply}`")
            ),
        }
    }
}

/// Stream of records sent by the listener after a successful data request.
#[derive(Debug)]
pub struct MaxScaleStream {
    reader: BufReader<OwnedReadHalf>,
    // Dropping the write half shuts the connection down, so it lives as long as the stream.
    _writer: OwnedWriteHalf,
    pending: Option<Vec<u8>>,
}

impl MaxScaleStream {
    /// Returns the next record, or `None` once the listener closed the connection.
    ///
    /// Records are returned verbatim, including their line terminator.
    pub async fn next_record(&mut self) -> CdcResult<Option<Record>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(Record::from(line)));
        }

        Ok(self.read_line().await?.map(Record::from))
    }

    async fn read_line(&mut self) -> CdcResult<Option<Vec<u8>>> {
        read_line_limited(&mut self.reader, MAX_LINE_LENGTH).await
    }
}

/// Reads one line of at most `limit` bytes from `reader`, terminator included.
///
/// Returns `None` at end of stream. The last line of the stream may lack a terminator. A line
/// that reaches `limit` bytes without a terminator is a protocol error.
async fn read_line_limited<R>(reader: &mut R, limit: u64) -> CdcResult<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let read = (&mut *reader)
        .take(limit)
        .read_until(b'\n', &mut line)
        .await
        .map_err(source_io_error)?;

    if read == 0 {
        return Ok(None);
    }

    if read as u64 == limit && line.last() != Some(&b'\n') {
        bail!(
            ErrorKind::SourceProtocolError,
            "The CDC listener sent a line exceeding the maximum length",
            format!("Lines are limited to {limit} bytes")
        );
    }

    Ok(Some(line))
}

/// Returns the message of an error reply, or `None` if `line` is not an error reply.
fn error_message(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let message = line.trim_end().strip_prefix(ERR_REPLY_PREFIX)?;

    Some(message.trim_start_matches([':', ' ']).to_string())
}

fn source_io_error(err: std::io::Error) -> CdcError {
    CdcError::from(err).with_kind(ErrorKind::SourceIoError)
}
