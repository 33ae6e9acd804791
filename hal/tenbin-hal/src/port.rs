//! Hardware port contract
//!
//! One instance exists per device. It is constructed once at startup and
//! passed by ownership into the application, never reached through a
//! global. The port is not reentrant: the single-threaded tick loop is
//! what serialises access to it.

use core::net::Ipv4Addr;

use heapless::Vec;

use crate::input::Button;
use crate::storage::StorageError;
use crate::wifi::{WifiCredentials, WifiNetwork, WifiStatus, MAX_SCAN_RESULTS};

/// Accelerometer reading in g
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Accel {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Accel {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Errors reported by a hardware port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortError {
    /// Sensor read failed (bus error or device not responding)
    Sensor,
    /// Credential storage failed
    Storage(StorageError),
    /// Access point could not be brought up
    AccessPoint,
    /// Station connect request was refused by the radio
    Connect,
    /// This variant cannot restart itself
    RestartUnavailable,
    /// Credentials failed validation
    InvalidCredentials,
}

impl From<StorageError> for PortError {
    fn from(e: StorageError) -> Self {
        PortError::Storage(e)
    }
}

/// Device capability interface
///
/// Implemented by each hardware variant. All calls are synchronous and
/// must return promptly; nothing here may block for an unbounded time.
pub trait HardwarePort {
    /// Sample inputs and advance any internal bookkeeping
    ///
    /// Called exactly once at the start of every tick.
    fn update(&mut self);

    /// Current debounced level of a button
    fn is_pressed(&self, button: Button) -> bool;

    /// Single-consume press edge
    ///
    /// Returns true at most once per physical press, then clears. A press
    /// and release that both land between two updates still latch.
    fn was_pressed(&mut self, button: Button) -> bool;

    /// Read the accelerometer
    fn read_accel(&mut self) -> Result<Accel, PortError>;

    /// Battery charge estimate (0..=100)
    fn battery_level(&mut self) -> Result<u8, PortError>;

    /// Battery terminal voltage in volts
    fn battery_voltage(&mut self) -> Result<f32, PortError>;

    /// Current backlight level
    fn brightness(&self) -> u8;

    /// Set backlight level
    fn set_brightness(&mut self, level: u8);

    /// Stable device identity (station MAC address)
    fn device_id(&self) -> [u8; 6];

    /// Whether a complete credential set is stored
    fn has_stored_credentials(&mut self) -> bool;

    /// Load stored credentials, if any
    fn load_credentials(&mut self) -> Option<WifiCredentials>;

    /// Persist credentials
    fn save_credentials(&mut self, credentials: &WifiCredentials) -> Result<(), PortError>;

    /// Remove stored credentials
    fn clear_credentials(&mut self) -> Result<(), PortError>;

    /// Current radio status
    fn wifi_status(&mut self) -> WifiStatus;

    /// Begin a station connection; completion is observed via [`Self::wifi_status`]
    fn connect(&mut self, credentials: &WifiCredentials) -> Result<(), PortError>;

    /// Drop any station connection
    fn disconnect(&mut self);

    /// Scan for nearby networks, returning at most `limit` entries
    fn scan_networks(&mut self, limit: usize) -> Vec<WifiNetwork, MAX_SCAN_RESULTS>;

    /// Start access point mode, returning the AP address
    fn start_access_point(&mut self, ssid: &str) -> Result<Ipv4Addr, PortError>;

    /// Stop access point mode
    fn stop_access_point(&mut self);

    /// Address on the current network (station or AP)
    fn ip_address(&self) -> Option<Ipv4Addr>;

    /// Restart the device
    ///
    /// Returns `Err(PortError::RestartUnavailable)` on variants that cannot
    /// reset themselves; callers fall back to an in-place transition.
    fn restart_device(&mut self) -> Result<(), PortError>;
}
