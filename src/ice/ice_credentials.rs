use crate::utils;

/// Local `ice-ufrag` / `ice-pwd` pair (RFC 8839 minimums are 4 and 22
/// characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCredentials {
    pub ufrag: String,
    pub pwd: String,
}

impl IceCredentials {
    const UFRAG_LEN: usize = 8;
    const PWD_LEN: usize = 24;

    #[must_use]
    pub fn generate() -> Self {
        Self {
            ufrag: utils::random_token(Self::UFRAG_LEN),
            pwd: utils::random_token(Self::PWD_LEN),
        }
    }
}
