use std::fmt;

use super::call_status::CallStatus;
use crate::{media::AcquisitionError, negotiation::NegotiationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The control is not enabled in the current status. Nothing changed.
    InvalidCallState {
        op: &'static str,
        status: CallStatus,
    },
    Acquisition(AcquisitionError),
    Negotiation(NegotiationError),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::InvalidCallState { op, status } => {
                write!(f, "'{op}' is not available while {status}")
            }
            CallError::Acquisition(e) => write!(f, "Media acquisition failed: {e}"),
            CallError::Negotiation(e) => write!(f, "Negotiation failed: {e}"),
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::InvalidCallState { .. } => None,
            CallError::Acquisition(e) => Some(e),
            CallError::Negotiation(e) => Some(e),
        }
    }
}

impl From<AcquisitionError> for CallError {
    fn from(e: AcquisitionError) -> Self {
        Self::Acquisition(e)
    }
}

impl From<NegotiationError> for CallError {
    fn from(e: NegotiationError) -> Self {
        Self::Negotiation(e)
    }
}
