use std::sync::Arc;

use super::{
    acquisition_error::AcquisitionError,
    capture_backend::{CaptureBackend, CaptureDevice},
    media_constraints::MediaConstraints,
    media_track::MediaTrack,
    track_kind::TrackKind,
};
use crate::{
    log::log_sink::LogSink,
    sink_debug, sink_info,
};

/// A live capture handle and the tracks it produces.
///
/// The source owns the capture device. Tracks handed out by [`tracks`] or
/// [`first_video_track`] share their live state with the source, so stopping
/// the source ends them everywhere. Dropping the source stops it too, so
/// capture is released on every exit path.
///
/// [`tracks`]: MediaSource::tracks
/// [`first_video_track`]: MediaSource::first_video_track
pub struct MediaSource {
    device: Option<Box<dyn CaptureDevice>>,
    tracks: Vec<MediaTrack>,
    logger: Arc<dyn LogSink>,
}

impl MediaSource {
    /// Opens the backend's devices under `constraints` and creates one live
    /// track per device stream.
    ///
    /// # Errors
    /// Propagates the backend's [`AcquisitionError`]; nothing stays open.
    pub fn acquire(
        backend: &mut dyn CaptureBackend,
        constraints: &MediaConstraints,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self, AcquisitionError> {
        let device = backend.open(constraints)?;
        let tracks: Vec<MediaTrack> = device
            .tracks()
            .into_iter()
            .map(|d| {
                let track = MediaTrack::new(d.kind, d.label);
                match d.resolution {
                    Some((w, h)) => track.with_resolution(w, h),
                    None => track,
                }
            })
            .collect();

        for t in &tracks {
            sink_info!(logger, "Using {} device: {}", t.kind(), t.label());
        }
        Ok(Self {
            device: Some(device),
            tracks,
            logger,
        })
    }

    #[must_use]
    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// The track attached to the outbound connection in a video call.
    #[must_use]
    pub fn first_video_track(&self) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind() == TrackKind::Video)
    }

    #[must_use]
    pub fn first_audio_track(&self) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind() == TrackKind::Audio)
    }

    #[must_use]
    pub fn live_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.device.is_some()
    }

    /// Stops every track and releases the device. Idempotent.
    pub fn stop(&mut self) {
        let Some(mut device) = self.device.take() else {
            return;
        };
        for t in &self.tracks {
            if t.stop() {
                sink_debug!(self.logger, "Stopped {} track {}", t.kind(), t.id());
            }
        }
        device.release();
        sink_info!(self.logger, "Media capture released");
    }
}

impl Drop for MediaSource {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSource")
            .field("active", &self.is_active())
            .field("tracks", &self.tracks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::{MemoryLogSink, log_level::LogLevel};
    use crate::media::synthetic_capture::{Permission, SyntheticCapture};

    fn logger() -> Arc<MemoryLogSink> {
        Arc::new(MemoryLogSink::new())
    }

    #[test]
    fn acquire_exposes_first_video_track() {
        let mut backend = SyntheticCapture::default();
        let sink = logger();
        let source =
            MediaSource::acquire(&mut backend, &MediaConstraints::default(), sink.clone()).unwrap();

        let video = source.first_video_track().expect("video");
        assert_eq!(video.resolution(), Some((1280, 720)));
        assert!(source.first_audio_track().is_some());
        assert_eq!(source.live_track_count(), 2);
        assert!(sink.contains(LogLevel::Info, "Using video device"));
    }

    #[test]
    fn stop_ends_shared_tracks_and_releases_once() {
        let mut backend = SyntheticCapture::default();
        let activity = backend.activity();
        let mut source =
            MediaSource::acquire(&mut backend, &MediaConstraints::default(), logger()).unwrap();
        let attached = source.first_video_track().cloned().unwrap();

        source.stop();
        source.stop();
        assert!(!attached.is_live());
        assert_eq!(source.live_track_count(), 0);
        assert!(!source.is_active());
        assert_eq!(activity.active_devices(), 0);
    }

    #[test]
    fn drop_releases_capture() {
        let mut backend = SyntheticCapture::default();
        let activity = backend.activity();
        let track = {
            let source =
                MediaSource::acquire(&mut backend, &MediaConstraints::default(), logger()).unwrap();
            assert_eq!(activity.active_devices(), 1);
            source.tracks()[0].clone()
        };
        assert!(!track.is_live());
        assert_eq!(activity.active_devices(), 0);
    }

    #[test]
    fn denied_permission_yields_no_source() {
        let mut backend = SyntheticCapture::new(Permission::Denied, Some((1280, 720)), true);
        let err = MediaSource::acquire(&mut backend, &MediaConstraints::default(), logger())
            .unwrap_err();
        assert_eq!(err.reason(), "permission-denied");
    }
}
