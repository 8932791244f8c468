use super::{acquisition_error::AcquisitionError, media_constraints::MediaConstraints, track_kind::TrackKind};

/// Description of one track a device produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub kind: TrackKind,
    pub label: String,
    pub resolution: Option<(u32, u32)>,
}

/// Platform capture entry point: turns constraints into an open device.
pub trait CaptureBackend {
    /// Opens (activates) the capture hardware.
    ///
    /// # Errors
    /// Returns an [`AcquisitionError`] describing why nothing was opened.
    fn open(&mut self, constraints: &MediaConstraints)
    -> Result<Box<dyn CaptureDevice>, AcquisitionError>;
}

/// An open capture device. Must be released exactly once the source ends.
pub trait CaptureDevice {
    fn tracks(&self) -> Vec<TrackDescriptor>;

    /// Deactivates the hardware. Calling it again is a no-op.
    fn release(&mut self);
}
