use std::{fmt, time::Duration};

use crate::log::{clock, log_level::LogLevel};

/// A single trace line.
///
/// `elapsed` is measured from process start; it is rendered with three
/// decimals, the format every trace line uses
/// (`12.345 Local peer connection created.`).
#[derive(Debug, Clone)]
pub struct LogMsg {
    /// The severity level of the line.
    pub level: LogLevel,
    /// Time since process start.
    pub elapsed: Duration,
    /// The message content.
    pub text: String,
    /// Module path the line originated from.
    pub target: &'static str,
}

impl LogMsg {
    /// Creates a new `LogMsg`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use looprtc::log::{log_level::LogLevel, log_msg::LogMsg};
    ///
    /// let msg = LogMsg::new(
    ///     LogLevel::Info,
    ///     "Requesting local stream.",
    ///     module_path!(),
    ///     Duration::from_millis(1_500),
    /// );
    /// assert_eq!(msg.to_string(), "[INFO] 1.500 | Requesting local stream.");
    /// ```
    pub fn new(
        level: LogLevel,
        text: impl Into<String>,
        target: &'static str,
        elapsed: Duration,
    ) -> Self {
        Self {
            level,
            elapsed,
            text: text.into(),
            target,
        }
    }

    /// Seconds since process start with millisecond precision.
    #[must_use]
    pub fn timestamp(&self) -> String {
        clock::format_secs(self.elapsed)
    }
}

impl fmt::Display for LogMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} | {}", self.level, self.timestamp(), self.text)
    }
}
