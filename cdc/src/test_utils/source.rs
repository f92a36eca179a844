use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{CdcError, CdcResult};
use crate::source::StreamSource;
use crate::types::Record;

/// Single step of a [`ScriptedSource`].
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Returns the record.
    Record(Record),
    /// Fails with the error.
    Fail(CdcError),
    /// Never returns, like a listener which stopped sending records.
    Pending,
}

/// [`StreamSource`] replaying a fixed script.
///
/// Once every step has been replayed the source reports the end of the stream.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    steps: VecDeque<ScriptStep>,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Creates a source returning `records` and then reporting the end of the stream.
    pub fn from_records<R>(records: impl IntoIterator<Item = R>) -> Self
    where
        R: Into<Record>,
    {
        Self::new(
            records
                .into_iter()
                .map(|record| ScriptStep::Record(record.into())),
        )
    }

    /// Appends a step to the script.
    pub fn then(mut self, step: ScriptStep) -> Self {
        self.steps.push_back(step);
        self
    }
}

impl StreamSource for ScriptedSource {
    fn name() -> &'static str {
        "scripted"
    }

    async fn next_record(&mut self) -> CdcResult<Option<Record>> {
        match self.steps.pop_front() {
            Some(ScriptStep::Record(record)) => Ok(Some(record)),
            Some(ScriptStep::Fail(err)) => Err(err),
            Some(ScriptStep::Pending) => std::future::pending().await,
            None => Ok(None),
        }
    }
}

/// [`StreamSource`] producing numbered records without ever ending.
///
/// Clones share the counter of produced records.
#[derive(Debug, Clone, Default)]
pub struct EndlessSource {
    produced: Arc<AtomicUsize>,
}

impl EndlessSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records produced so far.
    pub fn produced(&self) -> usize {
        self.produced.load(Ordering::SeqCst)
    }
}

impl StreamSource for EndlessSource {
    fn name() -> &'static str {
        "endless"
    }

    async fn next_record(&mut self) -> CdcResult<Option<Record>> {
        let index = self.produced.fetch_add(1, Ordering::SeqCst);

        Ok(Some(Record::from(format!("{index}\n"))))
    }
}
