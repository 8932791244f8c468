//! Capture backend over real hardware: the camera is opened through OpenCV
//! and the microphone is looked up on cpal's default host.
//!
//! Only presence and format are checked; frames are never pulled because
//! the loopback call carries no media bytes.

use cpal::traits::{DeviceTrait, HostTrait};
use opencv::{
    prelude::*,
    videoio::{self, VideoCapture},
};

use super::{
    acquisition_error::AcquisitionError,
    capture_backend::{CaptureBackend, CaptureDevice, TrackDescriptor},
    media_constraints::MediaConstraints,
    track_kind::TrackKind,
};

pub struct DeviceCapture {
    device_id: u32,
}

impl DeviceCapture {
    #[must_use]
    pub const fn new(device_id: u32) -> Self {
        Self { device_id }
    }

    fn open_camera(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<(VideoCapture, TrackDescriptor), AcquisitionError> {
        let index = i32::try_from(self.device_id)
            .map_err(|_| AcquisitionError::Backend(format!("invalid camera index {}", self.device_id)))?;
        let cam = VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| AcquisitionError::Backend(e.to_string()))?;
        if !cam.is_opened().unwrap_or(false) {
            return Err(AcquisitionError::NoDevice(TrackKind::Video));
        }

        let width = frame_dimension(&cam, videoio::CAP_PROP_FRAME_WIDTH)?;
        let height = frame_dimension(&cam, videoio::CAP_PROP_FRAME_HEIGHT)?;
        if let Some((constraint, required, actual)) = constraints.violation(width, height) {
            return Err(AcquisitionError::Overconstrained {
                constraint,
                required,
                actual,
            });
        }

        let descriptor = TrackDescriptor {
            kind: TrackKind::Video,
            label: format!("Camera {} ({width}x{height})", self.device_id),
            resolution: Some((width, height)),
        };
        Ok((cam, descriptor))
    }
}

fn frame_dimension(cam: &VideoCapture, prop: i32) -> Result<u32, AcquisitionError> {
    let value = cam
        .get(prop)
        .map_err(|e| AcquisitionError::Backend(e.to_string()))?
        .clamp(1.0, 8192.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(value.round() as u32)
}

fn microphone() -> Result<TrackDescriptor, AcquisitionError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(AcquisitionError::NoDevice(TrackKind::Audio))?;
    let label = device.name().unwrap_or_else(|_| "Default Microphone".to_owned());
    Ok(TrackDescriptor {
        kind: TrackKind::Audio,
        label,
        resolution: None,
    })
}

impl CaptureBackend for DeviceCapture {
    fn open(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn CaptureDevice>, AcquisitionError> {
        if !constraints.video && !constraints.audio {
            return Err(AcquisitionError::NothingRequested);
        }

        let mut tracks = Vec::new();
        let mut camera = None;
        if constraints.video {
            let (cam, descriptor) = self.open_camera(constraints)?;
            camera = Some(cam);
            tracks.push(descriptor);
        }
        if constraints.audio {
            // An already opened camera is dropped (and closed) on failure.
            tracks.push(microphone()?);
        }
        Ok(Box::new(OpenDevices { camera, tracks }))
    }
}

struct OpenDevices {
    camera: Option<VideoCapture>,
    tracks: Vec<TrackDescriptor>,
}

impl CaptureDevice for OpenDevices {
    fn tracks(&self) -> Vec<TrackDescriptor> {
        self.tracks.clone()
    }

    fn release(&mut self) {
        if let Some(mut cam) = self.camera.take() {
            let _ = cam.release();
        }
    }
}

impl Drop for OpenDevices {
    fn drop(&mut self) {
        self.release();
    }
}
