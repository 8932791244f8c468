use std::fmt;

/// Signaling state of one connection.
///
/// `HaveLocalAnswer` and `HaveRemoteAnswer` are transient: applying an
/// answer passes through them and settles in `Stable` within the same call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    New,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalAnswer,
    HaveRemoteAnswer,
    Stable,
    Closed,
}

impl fmt::Display for SignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalingState::New => "new",
            SignalingState::HaveLocalOffer => "have-local-offer",
            SignalingState::HaveRemoteOffer => "have-remote-offer",
            SignalingState::HaveLocalAnswer => "have-local-answer",
            SignalingState::HaveRemoteAnswer => "have-remote-answer",
            SignalingState::Stable => "stable",
            SignalingState::Closed => "closed",
        })
    }
}
