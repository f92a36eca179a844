use cdc_config::shared::MaxScaleConnectionConfig;
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::error::CdcResult;
use crate::source::StreamSource;
use crate::source::maxscale::client::{MaxScaleClient, MaxScaleStream};
use crate::types::Record;

/// [`StreamSource`] streaming the records of one table from a MaxScale CDC listener.
///
/// The connection and handshake happen lazily on the first call to
/// [`StreamSource::next_record`], so that connection failures surface as failures of the source
/// worker. When the listener closes the connection the stream is considered exhausted.
#[derive(Debug)]
pub struct MaxScaleSource {
    config: MaxScaleConnectionConfig,
    stream: Option<MaxScaleStream>,
}

impl MaxScaleSource {
    pub fn new(config: MaxScaleConnectionConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    async fn open_stream(config: &MaxScaleConnectionConfig) -> CdcResult<MaxScaleStream> {
        let uuid = config
            .uuid
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut client = MaxScaleClient::connect(&config.address()).await?;
        client
            .authenticate(&config.username, config.password.expose_secret())
            .await?;
        client.register(&uuid, config.format).await?;
        client
            .request_data(&config.qualified_table(), config.gtid.as_deref())
            .await
    }
}

impl StreamSource for MaxScaleSource {
    fn name() -> &'static str {
        "maxscale"
    }

    async fn next_record(&mut self) -> CdcResult<Option<Record>> {
        let stream = match &mut self.stream {
            Some(stream) => stream,
            slot @ None => slot.insert(Self::open_stream(&self.config).await?),
        };

        stream.next_record().await
    }
}
