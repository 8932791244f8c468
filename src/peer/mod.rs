//! One side of the loopback call: the connection state machine, its
//! identity and the events it publishes.
pub mod peer_connection;
pub mod peer_event;
pub mod peer_id;
pub mod signaling_error;
pub mod signaling_state;

pub use peer_connection::{CandidateDisposition, PeerConnection};
pub use peer_event::PeerEvent;
pub use peer_id::PeerId;
pub use signaling_error::SignalingError;
pub use signaling_state::SignalingState;
