//! Tenbin Hardware Abstraction Layer
//!
//! This crate defines the capability interface the control core consumes.
//! Every concrete device variant (the emulator, the M5Stick board) sits
//! behind [`HardwarePort`], so the gesture, screen and provisioning logic
//! is identical across targets.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tenbin-core (tick loop, screens, WiFi) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tenbin-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ EmulatedPort  │       │ M5StickPort   │
//! │ (host)        │       │ (board)       │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`port::HardwarePort`] - Everything the tick loop needs from a device
//! - [`wifi::WifiRadio`] - Radio primitives used by the board variant
//! - [`storage::CredentialStore`] - Persistent WiFi credentials
//! - [`system::SystemControl`] - Restart and backlight

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod input;
pub mod port;
pub mod storage;
pub mod system;
pub mod wifi;

// Re-export key types at crate root for convenience
pub use input::Button;
pub use port::{Accel, HardwarePort, PortError};
pub use storage::{CredentialStore, StorageError, StorageKey};
pub use system::SystemControl;
pub use wifi::{
    CredentialError, WifiCredentials, WifiNetwork, WifiRadio, WifiStatus, MAX_PASSWORD_LEN,
    MAX_SCAN_RESULTS, MAX_SSID_LEN,
};
