use std::time::{Duration, Instant};

use crate::{
    media::MediaTrack,
    negotiation::{NegotiationCoordinator, NegotiationError},
};

/// One placed call: both connections (inside the coordinator), when it was
/// placed and how far it got.
pub struct CallSession {
    pub(super) started_at: Instant,
    pub(super) coordinator: NegotiationCoordinator,
    pub(super) connected_at: Option<Instant>,
    pub(super) last_error: Option<NegotiationError>,
    pub(super) remote_tracks: Vec<MediaTrack>,
}

impl CallSession {
    pub(super) fn new(coordinator: NegotiationCoordinator, started_at: Instant) -> Self {
        Self {
            started_at,
            coordinator,
            connected_at: None,
            last_error: None,
            remote_tracks: Vec::new(),
        }
    }

    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Time from placing the call to both sides being connected.
    #[must_use]
    pub fn setup_time(&self) -> Option<Duration> {
        self.connected_at
            .map(|t| t.saturating_duration_since(self.started_at))
    }

    #[must_use]
    pub const fn coordinator(&self) -> &NegotiationCoordinator {
        &self.coordinator
    }

    #[must_use]
    pub const fn last_error(&self) -> Option<&NegotiationError> {
        self.last_error.as_ref()
    }

    /// Inbound tracks delivered to the remote side so far.
    #[must_use]
    pub fn remote_tracks(&self) -> &[MediaTrack] {
        &self.remote_tracks
    }
}
