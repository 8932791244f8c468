//! Session descriptions: the offer/answer payloads exchanged between the two
//! connections, how they are written and what is read back from them.
pub mod fingerprint;
pub mod media_direction;
pub mod media_section;
pub mod sdp_builder;
pub mod sdp_error;
pub mod sdp_summary;
pub mod sdp_type;
pub mod session_description;

pub use sdp_error::SdpError;
pub use sdp_type::SdpType;
pub use session_description::SessionDescription;
