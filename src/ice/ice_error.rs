use std::fmt;

use crate::peer::PeerId;

/// A relayed candidate that could not be applied. Reported and traced; the
/// call carries on with the candidates that did apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IceApplicationError {
    /// The `candidate:` line does not follow the grammar.
    Malformed(String),
    /// Neither `sdpMid` nor `sdpMLineIndex` names a section of the remote
    /// description.
    UnknownMid {
        mid: Option<String>,
        mline_index: Option<u16>,
    },
    /// `usernameFragment` differs from the remote description's ufrag.
    UfragMismatch { expected: String, got: String },
    /// The candidate was emitted by the connection it was delivered to.
    WrongOrigin(PeerId),
}

impl fmt::Display for IceApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IceApplicationError::Malformed(msg) => write!(f, "Malformed candidate: {msg}"),
            IceApplicationError::UnknownMid { mid, mline_index } => write!(
                f,
                "No media section for sdpMid={} sdpMLineIndex={}",
                mid.as_deref().unwrap_or("null"),
                mline_index.map_or_else(|| "null".to_owned(), |i| i.to_string())
            ),
            IceApplicationError::UfragMismatch { expected, got } => {
                write!(f, "Username fragment '{got}' does not match '{expected}'")
            }
            IceApplicationError::WrongOrigin(peer) => {
                write!(f, "Candidate from {peer} delivered back to {peer}")
            }
        }
    }
}

impl std::error::Error for IceApplicationError {}
