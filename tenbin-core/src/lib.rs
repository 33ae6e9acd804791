//! Board-agnostic control core for the Tenbin device
//!
//! This crate contains all application logic that does not depend on a
//! specific hardware variant:
//!
//! - Gesture classification (short release / long press per button)
//! - Screen state machine and its entry actions
//! - Throttled telemetry sampling
//! - WiFi provisioning workflow (connect, fall back to AP + captive portal)
//! - Render surface shared under a single render lock
//! - Configuration type definitions
//!
//! Everything is driven by [`app::App::tick`], called by an external loop.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod app;
pub mod config;
pub mod error;
pub mod gesture;
pub mod provisioning;
pub mod render;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use app::{App, Lifecycle, VersionInfo};
pub use error::CoreError;
