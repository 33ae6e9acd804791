//! Screen state machine
//!
//! Pure transition table plus a thin controller that owns the current
//! screen. Entry actions are returned to the caller; the controller holds
//! no business logic of its own.

mod controller;
mod events;
mod screen;

pub use controller::ScreenController;
pub use events::{Action, Reaction, ScreenEvent};
pub use screen::ScreenState;
