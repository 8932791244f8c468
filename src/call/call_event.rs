use std::time::Duration;

use super::call_status::CallStatus;
use crate::{
    ice::{ConnectivityState, IceApplicationError},
    negotiation::NegotiationError,
    peer::PeerId,
};

/// What a controller poll changed, for front-ends that react to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    StatusChanged(CallStatus),
    Connectivity(PeerId, ConnectivityState),
    /// An inbound track was rendered into `sink_id`.
    TrackRendered { sink_id: &'static str, track_id: String },
    /// Both sides connected, `setup_time` after the call was placed.
    Connected { setup_time: Duration },
    NegotiationFailed(NegotiationError),
    /// A candidate could not be applied by `to`; the call goes on.
    CandidateError { to: PeerId, error: IceApplicationError },
}
