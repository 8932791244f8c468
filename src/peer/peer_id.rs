use std::fmt;

/// Which of the two connections of the loopback call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerId {
    /// Owns the captured media and makes the offer.
    Local,
    /// Answers and receives the local media.
    Remote,
}

impl PeerId {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            PeerId::Local => PeerId::Remote,
            PeerId::Remote => PeerId::Local,
        }
    }

    /// Render sink showing this side's video: the local preview or the
    /// media received by the remote connection.
    #[must_use]
    pub const fn video_sink_id(self) -> &'static str {
        match self {
            PeerId::Local => "localVideo",
            PeerId::Remote => "remoteVideo",
        }
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PeerId::Local => "local",
            PeerId::Remote => "remote",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_helpers() {
        assert_eq!(PeerId::Local.other(), PeerId::Remote);
        assert_eq!(PeerId::Remote.other().other(), PeerId::Remote);
        assert_eq!(PeerId::Local.to_string(), "local");
        assert_eq!(PeerId::Remote.video_sink_id(), "remoteVideo");
    }
}
