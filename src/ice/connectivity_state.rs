use std::fmt;

/// `RTCIceConnectionState`, restricted to the transitions a loopback call
/// can make. Progress is monotonic by [`rank`](Self::rank).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    New,
    Checking,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl ConnectivityState {
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            ConnectivityState::New => 0,
            ConnectivityState::Checking => 1,
            ConnectivityState::Connected => 2,
            ConnectivityState::Disconnected | ConnectivityState::Failed => 3,
            ConnectivityState::Closed => 4,
        }
    }

    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        next.rank() > self.rank()
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectivityState::New => "new",
            ConnectivityState::Checking => "checking",
            ConnectivityState::Connected => "connected",
            ConnectivityState::Disconnected => "disconnected",
            ConnectivityState::Failed => "failed",
            ConnectivityState::Closed => "closed",
        })
    }
}
