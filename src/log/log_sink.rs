use crate::log::log_level::LogLevel;

/// Destination for trace lines. Implementations must never block the caller
/// for long and must never influence control flow.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}
