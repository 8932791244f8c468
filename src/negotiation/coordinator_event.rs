use super::{negotiation_error::NegotiationError, negotiation_step::NegotiationStep};
use crate::{
    ice::{IceApplicationError, IceCandidate},
    peer::{PeerEvent, PeerId},
};

/// What one coordinator poll observed.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// Every connection event is passed through unchanged.
    Peer(PeerId, PeerEvent),
    StepCompleted(NegotiationStep),
    /// All six steps succeeded.
    NegotiationComplete,
    NegotiationFailed(NegotiationError),
    /// A connection closed while steps were still pending.
    PipelineAbandoned(NegotiationStep),
    /// A relayed candidate was refused by the receiving connection.
    CandidateRejected {
        to: PeerId,
        candidate: IceCandidate,
        error: IceApplicationError,
    },
}
