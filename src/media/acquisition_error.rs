use std::fmt;

use super::track_kind::TrackKind;

/// Why a local media source could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    /// The user (or platform policy) refused access to the capture devices.
    PermissionDenied,
    /// No capture device of the requested kind exists.
    NoDevice(TrackKind),
    /// A device exists but cannot satisfy a minimum constraint.
    Overconstrained {
        constraint: &'static str,
        required: u32,
        actual: u32,
    },
    /// Neither audio nor video was requested.
    NothingRequested,
    /// The capture backend failed for another reason.
    Backend(String),
}

impl AcquisitionError {
    /// Short machine-readable reason tag.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            AcquisitionError::PermissionDenied => "permission-denied",
            AcquisitionError::NoDevice(_) => "no-device",
            AcquisitionError::Overconstrained { .. } => "overconstrained",
            AcquisitionError::NothingRequested => "nothing-requested",
            AcquisitionError::Backend(_) => "backend-failure",
        }
    }
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::PermissionDenied => write!(f, "Permission to capture media was denied"),
            AcquisitionError::NoDevice(kind) => write!(f, "No {kind} capture device found"),
            AcquisitionError::Overconstrained {
                constraint,
                required,
                actual,
            } => write!(
                f,
                "Constraint {constraint} cannot be satisfied (required {required}, device offers {actual})"
            ),
            AcquisitionError::NothingRequested => {
                write!(f, "At least one of audio or video must be requested")
            }
            AcquisitionError::Backend(msg) => write!(f, "Capture backend error: {msg}"),
        }
    }
}

impl std::error::Error for AcquisitionError {}
