use std::{
    sync::OnceLock,
    time::{Duration, Instant},
};

static PROCESS_START: OnceLock<Instant> = OnceLock::new();

/// Instant the trace clock counts from. Pinned on first use, so binaries call
/// this as early as possible in `main`.
pub fn process_start() -> Instant {
    *PROCESS_START.get_or_init(Instant::now)
}

/// Time elapsed since [`process_start`].
#[must_use]
pub fn since_start() -> Duration {
    process_start().elapsed()
}

/// Renders a duration as seconds with millisecond precision (`12.345`).
#[must_use]
pub fn format_secs(elapsed: Duration) -> String {
    format!("{:.3}", elapsed.as_secs_f64())
}
