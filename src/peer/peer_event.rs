use super::signaling_state::SignalingState;
use crate::{
    ice::{ConnectivityState, GatheringState, IceApplicationError, IceCandidate},
    media::MediaTrack,
    sdp::SdpType,
};

/// Notifications a connection publishes on its event channel, tagged with
/// its [`PeerId`](super::PeerId) by the sender.
#[derive(Debug, Clone)]
pub enum PeerEvent {
    SignalingStateChange(SignalingState),
    LocalDescriptionApplied(SdpType),
    RemoteDescriptionApplied(SdpType),
    /// A freshly gathered local candidate, to be trickled to the other side.
    IceCandidate(IceCandidate),
    /// Gathering finished; no further `IceCandidate` follows.
    EndOfCandidates,
    IceGatheringStateChange(GatheringState),
    /// A buffered remote candidate failed validation when it was flushed.
    CandidateRejected {
        candidate: IceCandidate,
        error: IceApplicationError,
    },
    ConnectivityChange(ConnectivityState),
    /// An inbound track is available. Sent once per remote track.
    Track(MediaTrack),
}
