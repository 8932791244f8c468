//! Capture backend that fakes its devices. Used by default by the CLI and by
//! tests; its behavior (permission, camera resolution, microphone presence)
//! is fully configurable.
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::{
    acquisition_error::AcquisitionError,
    capture_backend::{CaptureBackend, CaptureDevice, TrackDescriptor},
    media_constraints::MediaConstraints,
    track_kind::TrackKind,
};

/// Whether the platform grants capture access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Counts open synthetic devices; shared with the backend so callers can
/// check that hardware was released after the backend moved elsewhere.
#[derive(Debug, Clone, Default)]
pub struct CaptureActivity(Arc<AtomicUsize>);

impl CaptureActivity {
    #[must_use]
    pub fn active_devices(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticCapture {
    permission: Permission,
    camera: Option<(u32, u32)>,
    microphone: bool,
    activity: CaptureActivity,
}

impl Default for SyntheticCapture {
    /// A 720p camera and a microphone, access granted.
    fn default() -> Self {
        Self::new(Permission::Granted, Some((1280, 720)), true)
    }
}

impl SyntheticCapture {
    #[must_use]
    pub fn new(permission: Permission, camera: Option<(u32, u32)>, microphone: bool) -> Self {
        Self {
            permission,
            camera,
            microphone,
            activity: CaptureActivity::default(),
        }
    }

    /// Revokes or grants access for subsequent `open` calls.
    pub fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }

    #[must_use]
    pub fn activity(&self) -> CaptureActivity {
        self.activity.clone()
    }
}

impl CaptureBackend for SyntheticCapture {
    fn open(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn CaptureDevice>, AcquisitionError> {
        if !constraints.video && !constraints.audio {
            return Err(AcquisitionError::NothingRequested);
        }
        if self.permission == Permission::Denied {
            return Err(AcquisitionError::PermissionDenied);
        }

        let mut tracks = Vec::new();
        if constraints.video {
            let (width, height) = self.camera.ok_or(AcquisitionError::NoDevice(TrackKind::Video))?;
            if let Some((constraint, required, actual)) = constraints.violation(width, height) {
                return Err(AcquisitionError::Overconstrained {
                    constraint,
                    required,
                    actual,
                });
            }
            tracks.push(TrackDescriptor {
                kind: TrackKind::Video,
                label: format!("Synthetic Camera ({width}x{height})"),
                resolution: Some((width, height)),
            });
        }
        if constraints.audio {
            if !self.microphone {
                return Err(AcquisitionError::NoDevice(TrackKind::Audio));
            }
            tracks.push(TrackDescriptor {
                kind: TrackKind::Audio,
                label: "Synthetic Microphone".to_owned(),
                resolution: None,
            });
        }

        self.activity.0.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SyntheticDevice {
            tracks,
            activity: Some(self.activity.clone()),
        }))
    }
}

struct SyntheticDevice {
    tracks: Vec<TrackDescriptor>,
    activity: Option<CaptureActivity>,
}

impl CaptureDevice for SyntheticDevice {
    fn tracks(&self) -> Vec<TrackDescriptor> {
        self.tracks.clone()
    }

    fn release(&mut self) {
        if let Some(activity) = self.activity.take() {
            activity.0.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SyntheticDevice {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn opens_video_then_audio_and_counts_activity() {
        let mut cap = SyntheticCapture::default();
        let activity = cap.activity();
        let mut dev = cap.open(&MediaConstraints::default()).expect("granted");

        let tracks = dev.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].kind, TrackKind::Video);
        assert_eq!(tracks[0].resolution, Some((1280, 720)));
        assert_eq!(tracks[1].kind, TrackKind::Audio);
        assert_eq!(activity.active_devices(), 1);

        dev.release();
        dev.release();
        assert_eq!(activity.active_devices(), 0);
    }

    #[test]
    fn denied_permission_wins_over_missing_devices() {
        let mut cap = SyntheticCapture::new(Permission::Denied, None, false);
        let err = cap.open(&MediaConstraints::default()).err().expect("denied");
        assert_eq!(err, AcquisitionError::PermissionDenied);
        assert_eq!(err.reason(), "permission-denied");
        assert_eq!(cap.activity().active_devices(), 0);
    }

    #[test]
    fn small_camera_is_overconstrained() {
        let mut cap = SyntheticCapture::new(Permission::Granted, Some((640, 480)), true);
        let err = cap.open(&MediaConstraints::default()).err().expect("too small");
        assert_eq!(err.reason(), "overconstrained");
    }

    #[test]
    fn missing_microphone_only_matters_when_audio_requested() {
        let mut cap = SyntheticCapture::new(Permission::Granted, Some((1280, 720)), false);
        let err = cap.open(&MediaConstraints::default()).err().expect("no mic");
        assert_eq!(err, AcquisitionError::NoDevice(TrackKind::Audio));

        let video_only = MediaConstraints {
            audio: false,
            ..MediaConstraints::default()
        };
        assert_eq!(cap.open(&video_only).expect("video only").tracks().len(), 1);
    }
}
