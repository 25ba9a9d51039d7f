//! Application core
//!
//! Shared state, commands, and the controller that owns all mutation.

pub mod controller;
pub mod state;

pub use controller::AppController;
pub use state::{AppCommand, AppSnapshot, Route, SpeechPhase};
