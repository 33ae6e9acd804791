//! Configuration type definitions

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum access point SSID prefix length
pub const MAX_PREFIX_LEN: usize = 16;

/// Which hardware port variant to build at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PortVariant {
    /// Simulated sensors, in-memory radio
    #[default]
    Emulated,
    /// Real board peripherals
    Physical,
}

/// Button gesture thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InputConfig {
    /// Hold time before Button A reports a long press (ms)
    pub long_press_a_ms: u32,
    /// Hold time before Button B reports a long press (ms)
    pub long_press_b_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            long_press_a_ms: 1500,
            long_press_b_ms: 3000,
        }
    }
}

/// Telemetry refresh ratios, in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TelemetryConfig {
    pub accel_every_ticks: u32,
    pub battery_every_ticks: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            accel_every_ticks: 10,
            battery_every_ticks: 100,
        }
    }
}

/// Provisioning workflow parameters
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProvisioningConfig {
    /// Status polls before giving up on a stored network
    pub connect_attempts: u16,
    /// Wait between status polls (ms)
    pub connect_poll_ms: u32,
    /// Captive portal HTTP port
    pub http_port: u16,
    /// Wildcard DNS port
    pub dns_port: u16,
    /// AP name prefix; the last two MAC bytes are appended as hex
    pub ap_ssid_prefix: String<MAX_PREFIX_LEN>,
    /// Setup instruction blink period (ms)
    pub status_blink_ms: u32,
    /// Brightness increment per Button B short press
    pub brightness_step: u8,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        let mut prefix = String::new();
        let _ = prefix.push_str("M5Stick-");
        Self {
            connect_attempts: 50,
            connect_poll_ms: 100,
            http_port: 80,
            dns_port: 53,
            ap_ssid_prefix: prefix,
            status_blink_ms: 1000,
            brightness_step: 64,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AppConfig {
    pub input: InputConfig,
    pub telemetry: TelemetryConfig,
    pub provisioning: ProvisioningConfig,
    /// Period of the external tick driver (ms)
    pub tick_interval_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            telemetry: TelemetryConfig::default(),
            provisioning: ProvisioningConfig::default(),
            tick_interval_ms: 10,
        }
    }
}
