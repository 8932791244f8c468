use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use super::track_kind::TrackKind;
use crate::utils;

/// Handle to a live (or ended) media track.
///
/// Clones share the same underlying state: the render sink, the outbound
/// attachment of a peer connection and the owning [`MediaSource`] all observe
/// the same `live` flag. Only the owner is expected to call [`stop`].
///
/// [`MediaSource`]: super::media_source::MediaSource
/// [`stop`]: MediaTrack::stop
#[derive(Debug, Clone)]
pub struct MediaTrack {
    id: String,
    kind: TrackKind,
    label: String,
    resolution: Option<(u32, u32)>,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    /// New live track with a random id.
    #[must_use]
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self::with_id(utils::random_hex(16), kind, label)
    }

    /// New live track with a known id (inbound tracks keep the sender's id).
    #[must_use]
    pub fn with_id(id: impl Into<String>, kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            resolution: None,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn kind(&self) -> TrackKind {
        self.kind
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Frame size for video tracks.
    #[must_use]
    pub const fn resolution(&self) -> Option<(u32, u32)> {
        self.resolution
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Ends the track for every holder. Returns `true` if it was live.
    pub fn stop(&self) -> bool {
        self.live.swap(false, Ordering::SeqCst)
    }

    /// `true` when both handles refer to the same underlying track.
    #[must_use]
    pub fn same_track(&self, other: &MediaTrack) -> bool {
        Arc::ptr_eq(&self.live, &other.live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_live_state() {
        let track = MediaTrack::new(TrackKind::Video, "cam").with_resolution(1280, 720);
        let attached = track.clone();
        assert!(attached.is_live());
        assert!(track.same_track(&attached));

        assert!(track.stop());
        assert!(!attached.is_live());
        // Second stop is a no-op.
        assert!(!attached.stop());
        assert_eq!(attached.resolution(), Some((1280, 720)));
    }

    #[test]
    fn distinct_tracks_are_not_the_same() {
        let a = MediaTrack::with_id("t1", TrackKind::Audio, "mic");
        let b = MediaTrack::with_id("t1", TrackKind::Audio, "mic");
        assert!(!a.same_track(&b));
        assert_eq!(a.id(), "t1");
        assert_eq!(MediaTrack::new(TrackKind::Audio, "x").id().len(), 32);
    }
}
