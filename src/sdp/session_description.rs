use std::fmt;

use super::sdp_type::SdpType;

/// An immutable offer or answer: its type and the SDP text.
///
/// Produced by one connection, applied once as local description by its
/// producer and once as remote description by the counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    sdp_type: SdpType,
    sdp: String,
}

impl SessionDescription {
    #[must_use]
    pub fn new(sdp_type: SdpType, sdp: impl Into<String>) -> Self {
        Self {
            sdp_type,
            sdp: sdp.into(),
        }
    }

    #[must_use]
    pub const fn sdp_type(&self) -> SdpType {
        self.sdp_type
    }

    #[must_use]
    pub fn sdp(&self) -> &str {
        &self.sdp
    }
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.sdp_type, self.sdp.len())
    }
}
