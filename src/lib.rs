//! looprtc runs a complete WebRTC call inside one process.
//!
//! Local camera and microphone tracks are attached to one peer connection,
//! which negotiates with a second in-process connection through offer/answer
//! and trickled ICE candidates. The remote side renders what it receives,
//! and the whole exchange is traced with elapsed-time timestamps.
//!
//! The `looprtc` binary drives it from stdin with `start`, `call` and `end`.

/// The user-facing call: controls, status and session ownership.
pub mod call;
/// Command parsing for the interactive front-end.
pub mod cli;
/// Handles configuration loading and management.
pub mod config;
/// ICE candidates, gathering and connectivity checks.
pub mod ice;
/// Logging utilities for the application.
pub mod log;
/// Local media acquisition and tracks.
pub mod media;
/// Offer/answer pipeline and candidate relay between the two peers.
pub mod negotiation;
/// The peer connection state machine.
pub mod peer;
/// SDP writing and reading.
pub mod sdp;

pub(crate) mod utils;
