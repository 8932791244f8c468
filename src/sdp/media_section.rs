use super::media_direction::MediaDirection;
use crate::media::TrackKind;

/// One `m=` section as far as negotiation is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSection {
    pub mid: String,
    pub kind: TrackKind,
    pub direction: MediaDirection,
    /// `a=msid:<stream> <track>` when the author sends a track here.
    pub msid: Option<Msid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msid {
    pub stream_id: String,
    pub track_id: String,
}

impl MediaSection {
    /// RTP payload type and `a=rtpmap` encoding for the section's codec.
    #[must_use]
    pub const fn codec(&self) -> (u8, &'static str) {
        match self.kind {
            TrackKind::Video => (96, "VP8/90000"),
            TrackKind::Audio => (111, "opus/48000/2"),
        }
    }
}
