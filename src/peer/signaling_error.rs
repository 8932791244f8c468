use std::fmt;

use super::signaling_state::SignalingState;
use crate::sdp::{SdpError, SdpType};

/// Misuse of a connection's offer/answer API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingError {
    /// `createOffer` with no attached outbound track.
    NoOutboundTrack,
    /// `createOffer` while an offer of this connection is pending or applied.
    OfferInFlight,
    /// The operation is not valid in the current signaling state.
    InvalidState {
        op: &'static str,
        state: SignalingState,
    },
    /// `createAnswer` before any remote offer was applied.
    NoRemoteOffer,
    /// `setLocalDescription` with a description this connection did not create.
    ForeignDescription,
    /// A second description of a different type for the same slot.
    DescriptionTypeMismatch { applied: SdpType, given: SdpType },
    /// The remote payload could not be read.
    InvalidDescription(SdpError),
    Closed,
}

impl fmt::Display for SignalingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalingError::NoOutboundTrack => write!(f, "No outbound track attached"),
            SignalingError::OfferInFlight => write!(f, "An offer is already in flight"),
            SignalingError::InvalidState { op, state } => {
                write!(f, "{op} is not valid in state {state}")
            }
            SignalingError::NoRemoteOffer => write!(f, "No remote offer has been applied"),
            SignalingError::ForeignDescription => {
                write!(f, "Description was not created by this connection")
            }
            SignalingError::DescriptionTypeMismatch { applied, given } => {
                write!(f, "An {applied} is already applied; got an {given}")
            }
            SignalingError::InvalidDescription(e) => write!(f, "Invalid description: {e}"),
            SignalingError::Closed => write!(f, "Connection is closed"),
        }
    }
}

impl std::error::Error for SignalingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignalingError::InvalidDescription(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SdpError> for SignalingError {
    fn from(e: SdpError) -> Self {
        Self::InvalidDescription(e)
    }
}
