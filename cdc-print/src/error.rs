use cdc::error::CdcError;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

/// Returns whether terminal output should include backtraces.
fn should_render_backtrace() -> bool {
    matches!(
        std::env::var("RUST_BACKTRACE").as_deref(),
        Ok("1") | Ok("full")
    )
}

/// Result type for printer operations.
pub type PrinterResult<T> = Result<T, PrinterError>;

/// Captured backtrace wrapper to avoid thiserror's unstable feature detection.
pub struct CapturedBacktrace(Backtrace);

impl CapturedBacktrace {
    fn capture() -> Self {
        Self(Backtrace::capture())
    }
}

impl fmt::Debug for CapturedBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for the `cdc-print` binary.
///
/// Wraps [`CdcError`] for pipeline failures and adds variants for failures happening before the
/// pipeline starts.
#[derive(Debug)]
pub enum PrinterError {
    /// Pipeline failure.
    Cdc(CdcError),
    /// Configuration error.
    Config(Box<dyn Error + Send + Sync>, CapturedBacktrace),
    /// I/O error.
    Io(std::io::Error, CapturedBacktrace),
}

impl PrinterError {
    /// Returns a short category label for this error.
    pub fn category(&self) -> &'static str {
        match self {
            PrinterError::Cdc(_) => "pipeline error",
            PrinterError::Config(_, _) => "configuration error",
            PrinterError::Io(_, _) => "i/o error",
        }
    }

    /// Returns the backtrace for this error.
    pub fn backtrace(&self) -> &Backtrace {
        match self {
            PrinterError::Cdc(err) => err.backtrace(),
            PrinterError::Config(_, cb) => &cb.0,
            PrinterError::Io(_, cb) => &cb.0,
        }
    }

    /// Creates a configuration error from any error.
    pub fn config<E: Error + Send + Sync + 'static>(err: E) -> Self {
        PrinterError::Config(Box::new(err), CapturedBacktrace::capture())
    }

    /// Returns a user-oriented report for terminal output.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        out.push_str("application failed\n");
        out.push_str(&format!("category: {}\n", self.category()));
        out.push_str(&format!("error: {self}\n"));

        let mut source = Error::source(self);
        let mut idx = 1usize;
        while let Some(err) = source {
            out.push_str(&format!("cause {idx}: {err}\n"));
            source = err.source();
            idx += 1;
        }

        if should_render_backtrace() {
            out.push_str("backtrace:\n");
            out.push_str(&self.backtrace().to_string());
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }

        out
    }
}

impl fmt::Display for PrinterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterError::Cdc(err) => write!(f, "{err}"),
            PrinterError::Config(source, _) => write!(f, "configuration error: {source}"),
            PrinterError::Io(source, _) => write!(f, "i/o error: {source}"),
        }
    }
}

impl Error for PrinterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PrinterError::Cdc(err) => err.source(),
            PrinterError::Config(source, _) => Some(source.as_ref()),
            PrinterError::Io(source, _) => Some(source),
        }
    }
}

impl From<std::io::Error> for PrinterError {
    fn from(err: std::io::Error) -> Self {
        PrinterError::Io(err, CapturedBacktrace::capture())
    }
}

impl From<CdcError> for PrinterError {
    fn from(err: CdcError) -> Self {
        PrinterError::Cdc(err)
    }
}
