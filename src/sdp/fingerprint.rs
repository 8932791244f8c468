use std::fmt;

use rand::RngCore;
use sha2::{Digest, Sha256};

/// `a=fingerprint:sha-256` value: uppercase hex bytes joined by `:`.
///
/// There is no DTLS certificate in a loopback call, so the digest is taken
/// over fresh random bytes, one per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub const ALGORITHM: &'static str = "sha-256";

    #[must_use]
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut seed);
        let digest = Sha256::digest(seed);
        let hex: Vec<String> = digest.iter().map(|b| format!("{b:02X}")).collect();
        Self(hex.join(":"))
    }

    /// Accepts 32 colon-separated hex bytes.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        let parts: Vec<&str> = value.split(':').collect();
        parts.len() == 32
            && parts
                .iter()
                .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Self::ALGORITHM, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_fingerprints_are_valid_and_distinct() {
        let a = Fingerprint::generate();
        let b = Fingerprint::generate();
        assert!(Fingerprint::is_valid(a.as_str()));
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("sha-256 "));
        assert!(!Fingerprint::is_valid("AB:CD"));
    }
}
