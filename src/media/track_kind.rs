use std::{fmt, str::FromStr};

/// Kind of a media track; also the media type of an SDP `m=` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
        })
    }
}

impl FromStr for TrackKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "audio" => Ok(TrackKind::Audio),
            "video" => Ok(TrackKind::Video),
            _ => Err(()),
        }
    }
}
