//! Text front-end for the three call controls.
pub mod command;

pub use command::Command;
