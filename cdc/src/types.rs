use bytes::Bytes;
use std::fmt;
use std::ops::Deref;

/// A single change-data-capture record.
///
/// The content of a record is opaque to the pipeline: it is produced by a
/// [`StreamSource`](crate::source::StreamSource), moved through the record queue, and written
/// verbatim by a [`StreamSink`](crate::sink::StreamSink). Cloning is cheap since the payload is
/// reference counted.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Record(Bytes);

impl Record {
    /// Creates a new record from the given payload.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self(payload.into())
    }

    /// Returns the raw payload of the record.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the record and returns its payload.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Record {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Record {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for Record {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<Vec<u8>> for Record {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

impl From<&'static str> for Record {
    fn from(value: &'static str) -> Self {
        Self(Bytes::from_static(value.as_bytes()))
    }
}

impl From<String> for Record {
    fn from(value: String) -> Self {
        Self(Bytes::from(value))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Records are usually text, so render them lossily for readable logs and assertions.
        write!(f, "Record({:?})", String::from_utf8_lossy(&self.0))
    }
}
