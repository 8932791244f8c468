//! Local media acquisition: constraints, capture backends and the tracks they
//! produce.
pub mod acquisition_error;
pub mod capture_backend;
pub mod capture_settings;
#[cfg(feature = "devices")]
pub mod device_capture;
pub mod media_constraints;
pub mod media_source;
pub mod media_track;
pub mod synthetic_capture;
pub mod track_kind;

pub use acquisition_error::AcquisitionError;
pub use media_source::MediaSource;
pub use media_track::MediaTrack;
pub use track_kind::TrackKind;
