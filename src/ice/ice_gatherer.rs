use std::collections::{HashSet, VecDeque};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use super::{
    candidate_info::{CandidateInfo, MAX_LOCAL_PREF},
    gathering_state::GatheringState,
    ice_settings::IceSettings,
};
use crate::utils;

/// What one gathering step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatherEvent {
    Candidate(CandidateInfo),
    /// End-of-candidates: nothing more will be gathered.
    Complete,
}

/// Discovers loopback host candidates, releasing them one step at a time so
/// they trickle to the other side as they appear.
#[derive(Debug)]
pub struct IceGatherer {
    state: GatheringState,
    pending: VecDeque<CandidateInfo>,
    gathered: Vec<CandidateInfo>,
}

impl Default for IceGatherer {
    fn default() -> Self {
        Self::new()
    }
}

impl IceGatherer {
    const COMPONENT_RTP: u8 = 1;

    #[must_use]
    pub fn new() -> Self {
        Self {
            state: GatheringState::New,
            pending: VecDeque::new(),
            gathered: Vec::new(),
        }
    }

    /// Starts gathering `count` host candidates on distinct ports, at most
    /// [`IceSettings::MAX_HOST_CANDIDATES`]. Only the first call has an
    /// effect.
    pub fn start(&mut self, count: usize) -> bool {
        if self.state != GatheringState::New {
            return false;
        }
        let count = count.min(IceSettings::MAX_HOST_CANDIDATES);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let mut ports = HashSet::new();
        let mut local_pref = MAX_LOCAL_PREF;
        while self.pending.len() < count {
            let port = utils::random_dynamic_port();
            if !ports.insert(port) {
                continue;
            }
            self.pending.push_back(CandidateInfo::host(
                SocketAddr::new(ip, port),
                Self::COMPONENT_RTP,
                local_pref,
            ));
            local_pref = local_pref.saturating_sub(1);
        }
        self.state = GatheringState::Gathering;
        true
    }

    /// Releases the next candidate, then a single [`GatherEvent::Complete`].
    pub fn next_event(&mut self) -> Option<GatherEvent> {
        if self.state != GatheringState::Gathering {
            return None;
        }
        match self.pending.pop_front() {
            Some(c) => {
                self.gathered.push(c.clone());
                Some(GatherEvent::Candidate(c))
            }
            None => {
                self.state = GatheringState::Complete;
                Some(GatherEvent::Complete)
            }
        }
    }

    /// Abandons gathering without emitting anything further.
    pub fn stop(&mut self) {
        self.pending.clear();
        if self.state == GatheringState::Gathering {
            self.state = GatheringState::Complete;
        }
    }

    #[must_use]
    pub const fn state(&self) -> GatheringState {
        self.state
    }

    #[must_use]
    pub fn local_candidates(&self) -> &[CandidateInfo] {
        &self.gathered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trickles_candidates_then_completes_once() {
        let mut g = IceGatherer::new();
        assert_eq!(g.next_event(), None);
        assert!(g.start(3));
        assert!(!g.start(3));
        assert_eq!(g.state(), GatheringState::Gathering);

        let mut priorities = Vec::new();
        for _ in 0..3 {
            match g.next_event() {
                Some(GatherEvent::Candidate(c)) => {
                    assert!(c.address.ip().is_loopback());
                    priorities.push(c.priority);
                }
                other => panic!("expected candidate, got {other:?}"),
            }
        }
        assert!(priorities.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(g.next_event(), Some(GatherEvent::Complete));
        assert_eq!(g.next_event(), None);
        assert_eq!(g.state(), GatheringState::Complete);
        assert_eq!(g.local_candidates().len(), 3);
    }

    #[test]
    fn stop_swallows_the_rest() {
        let mut g = IceGatherer::new();
        g.start(2);
        g.stop();
        assert_eq!(g.next_event(), None);
        assert!(g.local_candidates().is_empty());
    }

    #[test]
    fn oversized_request_is_capped() {
        let mut g = IceGatherer::new();
        assert!(g.start(20_000));
        let mut n = 0;
        while let Some(GatherEvent::Candidate(_)) = g.next_event() {
            n += 1;
        }
        assert_eq!(n, IceSettings::MAX_HOST_CANDIDATES);
        assert_eq!(g.state(), GatheringState::Complete);
    }

    #[test]
    fn zero_candidates_still_signal_completion() {
        let mut g = IceGatherer::new();
        g.start(0);
        assert_eq!(g.next_event(), Some(GatherEvent::Complete));
    }
}
