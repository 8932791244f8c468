use std::fmt;

use crate::peer::PeerId;

/// The six steps of the offer/answer pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStep {
    CreateOffer,
    SetLocalOffer,
    SetRemoteOffer,
    CreateAnswer,
    SetLocalAnswer,
    SetRemoteAnswer,
}

impl NegotiationStep {
    /// Which connection performs the step. The local side offers.
    #[must_use]
    pub const fn side(self) -> PeerId {
        match self {
            Self::CreateOffer | Self::SetLocalOffer | Self::SetRemoteAnswer => PeerId::Local,
            Self::SetRemoteOffer | Self::CreateAnswer | Self::SetLocalAnswer => PeerId::Remote,
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::CreateOffer => Some(Self::SetLocalOffer),
            Self::SetLocalOffer => Some(Self::SetRemoteOffer),
            Self::SetRemoteOffer => Some(Self::CreateAnswer),
            Self::CreateAnswer => Some(Self::SetLocalAnswer),
            Self::SetLocalAnswer => Some(Self::SetRemoteAnswer),
            Self::SetRemoteAnswer => None,
        }
    }
}

impl fmt::Display for NegotiationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateOffer => "createOffer",
            Self::SetLocalOffer => "setLocalDescription(offer)",
            Self::SetRemoteOffer => "setRemoteDescription(offer)",
            Self::CreateAnswer => "createAnswer",
            Self::SetLocalAnswer => "setLocalDescription(answer)",
            Self::SetRemoteAnswer => "setRemoteDescription(answer)",
        })
    }
}
