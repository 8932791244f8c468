//! Where media ends up. The call never draws anything itself; it tells a
//! [`RenderSink`] which tracks belong in which named video element.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{log::log_sink::LogSink, media::MediaTrack, sink_info};

pub trait RenderSink: Send + Sync {
    /// Shows `tracks` in `sink_id`. An empty slice clears the sink.
    fn render(&self, sink_id: &str, tracks: &[MediaTrack]);
}

/// Reports rendering as trace lines; used by the CLI.
pub struct LogRenderSink {
    logger: Arc<dyn LogSink>,
}

impl LogRenderSink {
    #[must_use]
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self { logger }
    }
}

impl RenderSink for LogRenderSink {
    fn render(&self, sink_id: &str, tracks: &[MediaTrack]) {
        if tracks.is_empty() {
            sink_info!(self.logger, "[{}] cleared", sink_id);
            return;
        }
        for t in tracks {
            match t.resolution() {
                Some((w, h)) => {
                    sink_info!(self.logger, "[{}] showing {} ({}x{})", sink_id, t.label(), w, h);
                }
                None => sink_info!(self.logger, "[{}] playing {}", sink_id, t.label()),
            }
        }
    }
}

/// Remembers what each sink currently shows.
#[derive(Debug, Default)]
pub struct MemoryRenderSink {
    sinks: Mutex<HashMap<String, Vec<MediaTrack>>>,
}

impl MemoryRenderSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks currently shown in `sink_id`.
    #[must_use]
    pub fn showing(&self, sink_id: &str) -> Vec<MediaTrack> {
        self.sinks
            .lock()
            .ok()
            .and_then(|s| s.get(sink_id).cloned())
            .unwrap_or_default()
    }
}

impl RenderSink for MemoryRenderSink {
    fn render(&self, sink_id: &str, tracks: &[MediaTrack]) {
        if let Ok(mut sinks) = self.sinks.lock() {
            sinks.insert(sink_id.to_owned(), tracks.to_vec());
        }
    }
}
