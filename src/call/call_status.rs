use std::fmt;

/// Overall state of the loopback call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// Nothing acquired yet.
    Idle,
    /// Local media is captured and previewed.
    MediaReady,
    /// `call` was placed; negotiation or connectivity is in progress.
    Negotiating,
    /// Both connections report `connected`.
    Connected,
    /// `end` ran; capture is released.
    Ended,
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CallStatus::Idle => "idle",
            CallStatus::MediaReady => "media-ready",
            CallStatus::Negotiating => "negotiating",
            CallStatus::Connected => "connected",
            CallStatus::Ended => "ended",
        })
    }
}
