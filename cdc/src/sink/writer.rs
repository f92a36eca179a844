use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};

use crate::error::{CdcError, CdcResult, ErrorKind};
use crate::sink::StreamSink;
use crate::types::Record;

/// [`StreamSink`] writing records verbatim to an [`AsyncWrite`] device.
///
/// Every record is flushed right after being written, so records become visible downstream one
/// at a time.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl WriterSink<Stdout> {
    /// Creates a sink writing to the standard output of the process.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> StreamSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn name() -> &'static str {
        "writer"
    }

    async fn write_record(&mut self, record: Record) -> CdcResult<()> {
        self.writer
            .write_all(record.as_bytes())
            .await
            .map_err(sink_io_error)?;
        self.writer.flush().await.map_err(sink_io_error)?;

        Ok(())
    }
}

fn sink_io_error(err: std::io::Error) -> CdcError {
    CdcError::from(err).with_kind(ErrorKind::SinkIoError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn records_are_written_verbatim_in_order() {
        let mut sink = WriterSink::new(Vec::new());

        sink.write_record("{\"id\":1}\n".into()).await.unwrap();
        sink.write_record("{\"id\":2}\n".into()).await.unwrap();

        assert_eq!(sink.into_inner(), b"{\"id\":1}\n{\"id\":2}\n");
    }

    #[tokio::test]
    async fn write_failure_is_a_sink_error() {
        let mut sink = WriterSink::new(BrokenPipe);

        let err = sink.write_record("a".into()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkIoError);
    }
}
