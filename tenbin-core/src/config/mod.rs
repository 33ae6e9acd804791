//! Configuration types
//!
//! Plain data with defaults; the host runner overlays a TOML file on top.

mod types;

pub use types::*;
