use std::fmt;

use super::negotiation_step::NegotiationStep;
use crate::peer::{PeerId, SignalingError};

/// The one error a failed pipeline produces: which step, on which side,
/// and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationError {
    pub step: NegotiationStep,
    pub side: PeerId,
    pub cause: SignalingError,
}

impl NegotiationError {
    #[must_use]
    pub const fn new(step: NegotiationStep, cause: SignalingError) -> Self {
        Self {
            step,
            side: step.side(),
            cause,
        }
    }
}

impl fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed on {}: {}", self.step, self.side, self.cause)
    }
}

impl std::error::Error for NegotiationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}
