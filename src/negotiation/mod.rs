//! The in-process relay between the two connections: the offer/answer
//! pipeline and trickled candidate delivery.
pub mod coordinator_event;
pub mod negotiation_coordinator;
pub mod negotiation_error;
pub mod negotiation_step;
pub mod offer_options;

pub use coordinator_event::CoordinatorEvent;
pub use negotiation_coordinator::NegotiationCoordinator;
pub use negotiation_error::NegotiationError;
pub use negotiation_step::NegotiationStep;
pub use offer_options::OfferOptions;
