//! Hardware port implementations
//!
//! This crate provides the two [`HardwarePort`](tenbin_hal::HardwarePort)
//! variants the control core runs against:
//!
//! - [`EmulatedPort`]: simulated sensors and an in-memory radio, for host
//!   runs and tests
//! - [`M5StickPort`]: MPU6886 accelerometer and AXP192 gauge on I2C,
//!   active-low buttons, a board radio and flash-backed credentials
//!
//! [`SelectedPort::from_variant`] builds one of them from the configured
//! [`PortVariant`](tenbin_core::config::PortVariant) at startup.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod emulated;
pub mod flash_store;
pub mod imu;
pub mod input;
pub mod physical;
pub mod pmic;
pub mod select;

#[cfg(test)]
mod test_bus;

pub use emulated::{EmulatedOptions, EmulatedPort, MemoryStore};
pub use flash_store::FlashCredentialStore;
pub use imu::Mpu6886;
pub use input::ButtonLatch;
pub use physical::M5StickPort;
pub use pmic::Axp192;
pub use select::SelectedPort;
