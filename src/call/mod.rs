//! The call as the user drives it: status, enabled controls, and the
//! controller that owns media and connections for the duration of a call.
pub mod call_controller;
pub mod call_error;
pub mod call_event;
pub mod call_session;
pub mod call_status;
pub mod control_state;
pub mod render_sink;

pub use call_controller::CallController;
pub use call_error::CallError;
pub use call_event::CallEvent;
pub use call_status::CallStatus;
pub use control_state::ControlState;
pub use render_sink::{LogRenderSink, MemoryRenderSink, RenderSink};
