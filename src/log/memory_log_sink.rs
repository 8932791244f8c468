use std::sync::Mutex;

use crate::log::{clock, log_level::LogLevel, log_msg::LogMsg, log_sink::LogSink};

/// Sink that keeps every line in memory.
///
/// Handy for embedders that render their own trace panel, and for asserting on
/// trace output in tests.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<LogMsg>>,
}

impl MemoryLogSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    #[must_use]
    pub fn messages(&self) -> Vec<LogMsg> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Returns `true` if any line at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lines
            .lock()
            .map(|l| l.iter().any(|m| m.level == level && m.text.contains(needle)))
            .unwrap_or(false)
    }

    /// Number of lines logged at `level`.
    #[must_use]
    pub fn count(&self, level: LogLevel) -> usize {
        self.lines
            .lock()
            .map(|l| l.iter().filter(|m| m.level == level).count())
            .unwrap_or(0)
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(LogMsg::new(level, msg, target, clock::since_start()));
        }
    }
}
