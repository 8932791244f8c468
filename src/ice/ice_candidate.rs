use super::{candidate_info::CandidateInfo, ice_error::IceApplicationError};
use crate::peer::PeerId;

/// A trickled candidate as it travels between the connections: the
/// `candidate:` attribute text plus the routing fields of
/// `RTCIceCandidateInit`, tagged with the connection that gathered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    pub origin: PeerId,
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_mline_index: Option<u16>,
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    #[must_use]
    pub fn new(origin: PeerId, info: &CandidateInfo, mid: &str, mline_index: u16, ufrag: &str) -> Self {
        Self {
            origin,
            candidate: info.to_string(),
            sdp_mid: Some(mid.to_owned()),
            sdp_mline_index: Some(mline_index),
            username_fragment: Some(ufrag.to_owned()),
        }
    }

    /// # Errors
    /// [`IceApplicationError::Malformed`] when the line does not parse.
    pub fn parse(&self) -> Result<CandidateInfo, IceApplicationError> {
        self.candidate
            .parse()
            .map_err(IceApplicationError::Malformed)
    }
}
