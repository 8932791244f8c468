use std::cmp::{max, min};

use super::candidate_info::CandidateInfo;

/// A local/remote candidate pair and its RFC 8445 §6.1.2.3 priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePair {
    pub local: CandidateInfo,
    pub remote: CandidateInfo,
    pub priority: u64,
}

impl CandidatePair {
    /// The controlling agent's candidate is `G`, the controlled one's `D`.
    #[must_use]
    pub fn new(local: CandidateInfo, remote: CandidateInfo, controlling: bool) -> Self {
        let (g, d) = if controlling {
            (local.priority, remote.priority)
        } else {
            (remote.priority, local.priority)
        };
        let priority = Self::pair_priority(u64::from(g), u64::from(d));
        Self {
            local,
            remote,
            priority,
        }
    }

    fn pair_priority(g: u64, d: u64) -> u64 {
        (1 << 32) * min(g, d) + 2 * max(g, d) + u64::from(g > d)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn host(port: u16, pref: u16) -> CandidateInfo {
        CandidateInfo::host(format!("127.0.0.1:{port}").parse().unwrap(), 1, pref)
    }

    #[test]
    fn both_sides_compute_the_same_priority() {
        let a = host(50000, 65_535);
        let b = host(50002, 65_534);
        let from_controlling = CandidatePair::new(a.clone(), b.clone(), true);
        let from_controlled = CandidatePair::new(b, a, false);
        assert_eq!(from_controlling.priority, from_controlled.priority);
    }

    #[test]
    fn higher_candidates_make_higher_pairs() {
        let best = CandidatePair::new(host(1, 65_535), host(2, 65_535), true);
        let worse = CandidatePair::new(host(1, 65_535), host(3, 100), true);
        assert!(best.priority > worse.priority);
    }
}
