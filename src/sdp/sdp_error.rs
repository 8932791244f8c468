use std::fmt;
use std::num::ParseIntError;

/// Why an SDP payload could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdpError {
    Missing(&'static str),
    Invalid(&'static str),
    ParseInt(ParseIntError),
}

impl From<ParseIntError> for SdpError {
    fn from(e: ParseIntError) -> Self {
        Self::ParseInt(e)
    }
}

impl fmt::Display for SdpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpError::Missing(msg) => write!(f, "Missing field: {msg}"),
            SdpError::Invalid(msg) => write!(f, "Invalid field: {msg}"),
            SdpError::ParseInt(e) => write!(f, "Parse int error: {e}"),
        }
    }
}

impl std::error::Error for SdpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SdpError::ParseInt(e) => Some(e),
            _ => None,
        }
    }
}
