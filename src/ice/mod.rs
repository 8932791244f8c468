//! Interactive Connectivity Establishment for the loopback call: candidate
//! grammar and priorities, trickled gathering, and the simulated checks
//! that take a connection to `connected`.
pub mod candidate_info;
pub mod candidate_pair;
pub mod candidate_type;
pub mod connectivity_checker;
pub mod connectivity_state;
pub mod gathering_state;
pub mod ice_candidate;
pub mod ice_credentials;
pub mod ice_error;
pub mod ice_gatherer;
pub mod ice_settings;

pub use connectivity_state::ConnectivityState;
pub use gathering_state::GatheringState;
pub use ice_candidate::IceCandidate;
pub use ice_error::IceApplicationError;
