//! Button gesture classification
//!
//! Turns per-tick raw button levels into discrete press-start,
//! short-release and long-press events. No debouncing happens here; the
//! hardware port is expected to deliver clean levels.

mod classifier;

pub use classifier::{ButtonGestureState, Gesture, GestureClassifier};
