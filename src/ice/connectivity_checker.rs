use std::time::{Duration, Instant};

use super::{
    candidate_info::CandidateInfo, candidate_pair::CandidatePair,
    connectivity_state::ConnectivityState, ice_settings::IceSettings,
};

/// Simulated connectivity checks over the known candidate pairs.
///
/// Checks start once both descriptions are applied. After `check_delay` the
/// highest-priority pair is nominated and the state becomes `connected`;
/// with no pair by `check_timeout` it becomes `failed`. Failures are final.
#[derive(Debug)]
pub struct ConnectivityChecker {
    controlling: bool,
    state: ConnectivityState,
    checking_since: Option<Instant>,
    local: Vec<CandidateInfo>,
    remote: Vec<CandidateInfo>,
    nominated: Option<CandidatePair>,
    check_delay: Duration,
    check_timeout: Duration,
}

impl ConnectivityChecker {
    #[must_use]
    pub fn new(controlling: bool, settings: &IceSettings) -> Self {
        Self {
            controlling,
            state: ConnectivityState::New,
            checking_since: None,
            local: Vec::new(),
            remote: Vec::new(),
            nominated: None,
            check_delay: settings.check_delay,
            check_timeout: settings.check_timeout,
        }
    }

    pub fn set_controlling(&mut self, controlling: bool) {
        self.controlling = controlling;
    }

    #[must_use]
    pub const fn state(&self) -> ConnectivityState {
        self.state
    }

    #[must_use]
    pub const fn nominated(&self) -> Option<&CandidatePair> {
        self.nominated.as_ref()
    }

    pub fn add_local(&mut self, candidate: CandidateInfo) {
        self.local.push(candidate);
    }

    pub fn add_remote(&mut self, candidate: CandidateInfo) {
        self.remote.push(candidate);
    }

    #[must_use]
    pub fn remote_candidates(&self) -> &[CandidateInfo] {
        &self.remote
    }

    /// `new → checking`. Returns the new state if it changed.
    pub fn start_checks(&mut self, now: Instant) -> Option<ConnectivityState> {
        let changed = self.advance(ConnectivityState::Checking)?;
        self.checking_since = Some(now);
        Some(changed)
    }

    /// Drives `checking` forward. Returns the new state if it changed.
    pub fn poll(&mut self, now: Instant) -> Option<ConnectivityState> {
        if self.state != ConnectivityState::Checking {
            return None;
        }
        let since = self.checking_since?;
        let elapsed = now.saturating_duration_since(since);
        if elapsed >= self.check_delay {
            if let Some(pair) = self.best_pair() {
                self.nominated = Some(pair);
                return self.advance(ConnectivityState::Connected);
            }
        }
        if elapsed >= self.check_timeout {
            return self.advance(ConnectivityState::Failed);
        }
        None
    }

    /// Only a connection that got as far as checking can lose its peer.
    pub fn disconnect(&mut self) -> Option<ConnectivityState> {
        if self.state == ConnectivityState::New {
            return None;
        }
        self.advance(ConnectivityState::Disconnected)
    }

    pub fn close(&mut self) -> Option<ConnectivityState> {
        self.advance(ConnectivityState::Closed)
    }

    fn best_pair(&self) -> Option<CandidatePair> {
        self.local
            .iter()
            .flat_map(|l| {
                self.remote
                    .iter()
                    .map(|r| CandidatePair::new(l.clone(), r.clone(), self.controlling))
            })
            .max_by_key(|p| p.priority)
    }

    fn advance(&mut self, next: ConnectivityState) -> Option<ConnectivityState> {
        if !self.state.can_advance_to(next) {
            return None;
        }
        self.state = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::ice::candidate_info::MAX_LOCAL_PREF;

    fn host(port: u16, pref: u16) -> CandidateInfo {
        CandidateInfo::host(format!("127.0.0.1:{port}").parse().unwrap(), 1, pref)
    }

    fn settings() -> IceSettings {
        IceSettings {
            host_candidates: 2,
            check_delay: Duration::from_millis(40),
            check_timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn nominates_best_pair_after_delay() {
        let t0 = Instant::now();
        let mut c = ConnectivityChecker::new(true, &settings());
        c.add_local(host(50000, MAX_LOCAL_PREF));
        c.add_local(host(50001, MAX_LOCAL_PREF - 1));
        c.add_remote(host(60000, MAX_LOCAL_PREF - 1));
        c.add_remote(host(60001, MAX_LOCAL_PREF));

        assert_eq!(c.poll(t0), None);
        assert_eq!(c.start_checks(t0), Some(ConnectivityState::Checking));
        assert_eq!(c.start_checks(t0), None);
        assert_eq!(c.poll(t0 + Duration::from_millis(10)), None);
        assert_eq!(
            c.poll(t0 + Duration::from_millis(40)),
            Some(ConnectivityState::Connected)
        );
        let pair = c.nominated().unwrap();
        assert_eq!(pair.local.address.port(), 50000);
        assert_eq!(pair.remote.address.port(), 60001);
    }

    #[test]
    fn fails_without_pairs_and_never_goes_back() {
        let t0 = Instant::now();
        let mut c = ConnectivityChecker::new(false, &settings());
        c.start_checks(t0);
        assert_eq!(c.poll(t0 + Duration::from_millis(100)), None);
        assert_eq!(
            c.poll(t0 + Duration::from_millis(200)),
            Some(ConnectivityState::Failed)
        );
        c.add_local(host(1, 1));
        c.add_remote(host(2, 1));
        assert_eq!(c.poll(t0 + Duration::from_secs(1)), None);
        assert_eq!(c.disconnect(), None);
        assert_eq!(c.close(), Some(ConnectivityState::Closed));
        assert_eq!(c.close(), None);
        assert_eq!(c.start_checks(t0), None);
    }
}
