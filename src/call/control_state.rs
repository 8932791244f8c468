use std::fmt;

use super::call_status::CallStatus;

/// Which controls of the surface are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub start: bool,
    pub call: bool,
    pub end: bool,
}

impl ControlState {
    #[must_use]
    pub const fn for_status(status: CallStatus) -> Self {
        Self {
            start: matches!(status, CallStatus::Idle | CallStatus::Ended),
            call: matches!(status, CallStatus::MediaReady),
            end: matches!(status, CallStatus::Negotiating | CallStatus::Connected),
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |on: bool| if on { "x" } else { " " };
        write!(
            f,
            "start[{}] call[{}] end[{}]",
            mark(self.start),
            mark(self.call),
            mark(self.end)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_the_next_action_is_enabled() {
        assert_eq!(
            ControlState::for_status(CallStatus::Idle),
            ControlState {
                start: true,
                call: false,
                end: false
            }
        );
        assert!(ControlState::for_status(CallStatus::MediaReady).call);
        assert!(ControlState::for_status(CallStatus::Negotiating).end);
        assert!(!ControlState::for_status(CallStatus::Connected).start);
        assert!(ControlState::for_status(CallStatus::Ended).start);
        assert_eq!(
            ControlState::for_status(CallStatus::MediaReady).to_string(),
            "start[ ] call[x] end[ ]"
        );
    }
}
