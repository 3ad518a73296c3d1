//! Control over FFmpeg's own stderr logging.
//!
//! The C libraries print warnings and errors to stderr independently of the
//! Rust [`log`] facade. [`set_native_log_level`] lets library users silence
//! or tune that output without depending on `ffmpeg-next` themselves.
//! Rust-side diagnostics from this crate are unaffected; configure those
//! through a normal `log` subscriber.

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

/// Verbosity of FFmpeg's internal stderr logging.
///
/// Ordered most quiet to most verbose. Maps directly onto the `AV_LOG_*`
/// constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeLogLevel {
    /// No output at all.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging output.
    Debug,
    /// Extremely verbose tracing.
    Trace,
}

impl From<NativeLogLevel> for Level {
    fn from(level: NativeLogLevel) -> Self {
        match level {
            NativeLogLevel::Quiet => Level::Quiet,
            NativeLogLevel::Panic => Level::Panic,
            NativeLogLevel::Fatal => Level::Fatal,
            NativeLogLevel::Error => Level::Error,
            NativeLogLevel::Warning => Level::Warning,
            NativeLogLevel::Info => Level::Info,
            NativeLogLevel::Verbose => Level::Verbose,
            NativeLogLevel::Debug => Level::Debug,
            NativeLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for NativeLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Ok(NativeLogLevel::Quiet),
            "panic" => Ok(NativeLogLevel::Panic),
            "fatal" => Ok(NativeLogLevel::Fatal),
            "error" => Ok(NativeLogLevel::Error),
            "warning" => Ok(NativeLogLevel::Warning),
            "info" => Ok(NativeLogLevel::Info),
            "verbose" => Ok(NativeLogLevel::Verbose),
            "debug" => Ok(NativeLogLevel::Debug),
            "trace" => Ok(NativeLogLevel::Trace),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Set the verbosity of FFmpeg's stderr output.
///
/// # Example
///
/// ```no_run
/// use framefeed::NativeLogLevel;
///
/// // Only surface real errors from the C libraries.
/// framefeed::set_native_log_level(NativeLogLevel::Error);
/// ```
pub fn set_native_log_level(level: NativeLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}
