use std::time::Duration;

use crate::config::Config;

/// `[Ice]` tuning for gathering and the simulated connectivity checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceSettings {
    /// Host candidates gathered per connection.
    pub host_candidates: usize,
    /// Time between entering `checking` and nominating a pair.
    pub check_delay: Duration,
    /// `checking` turns into `failed` after this long without any pair.
    pub check_timeout: Duration,
}

impl Default for IceSettings {
    fn default() -> Self {
        Self {
            host_candidates: 2,
            check_delay: Duration::from_millis(40),
            check_timeout: Duration::from_millis(3000),
        }
    }
}

impl IceSettings {
    /// Upper bound on `host_candidates`; each one needs its own port.
    pub const MAX_HOST_CANDIDATES: usize = 64;

    /// # Errors
    /// Returns the first invalid `[Ice]` value, an error if
    /// `host_candidates` is outside `1..=MAX_HOST_CANDIDATES`, or one if
    /// `check_timeout_ms` is not larger than `check_delay_ms`.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let d = Self::default();
        let settings = Self {
            host_candidates: config.get_parsed("Ice", "host_candidates", d.host_candidates)?,
            check_delay: config.get_millis("Ice", "check_delay_ms", d.check_delay)?,
            check_timeout: config.get_millis("Ice", "check_timeout_ms", d.check_timeout)?,
        };
        if !(1..=Self::MAX_HOST_CANDIDATES).contains(&settings.host_candidates) {
            return Err(format!(
                "[Ice] host_candidates must be between 1 and {}",
                Self::MAX_HOST_CANDIDATES
            ));
        }
        if settings.check_timeout <= settings.check_delay {
            return Err("[Ice] check_timeout_ms must be larger than check_delay_ms".to_owned());
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn reads_overrides_and_validates_ordering() {
        let cfg = Config::parse("[Ice]\nhost_candidates = 1\ncheck_delay_ms = 5\n");
        let s = IceSettings::from_config(&cfg);
        assert_eq!(
            s,
            Ok(IceSettings {
                host_candidates: 1,
                check_delay: Duration::from_millis(5),
                check_timeout: Duration::from_millis(3000),
            })
        );
        let bad = Config::parse("[Ice]\ncheck_delay_ms = 100\ncheck_timeout_ms = 50\n");
        assert!(IceSettings::from_config(&bad).is_err());
    }

    #[test]
    fn host_candidate_count_is_bounded() {
        for raw in ["0", "65", "20000"] {
            let cfg = Config::parse(&format!("[Ice]\nhost_candidates = {raw}\n"));
            let err = IceSettings::from_config(&cfg).unwrap_err();
            assert!(err.contains("host_candidates"), "{raw}: {err}");
        }
        let max = Config::parse("[Ice]\nhost_candidates = 64\n");
        assert_eq!(
            IceSettings::from_config(&max).map(|s| s.host_candidates),
            Ok(IceSettings::MAX_HOST_CANDIDATES)
        );
    }
}
