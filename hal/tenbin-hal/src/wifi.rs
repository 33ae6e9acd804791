//! WiFi value types and radio abstraction

use core::fmt;
use core::net::Ipv4Addr;

use heapless::{String, Vec};

use crate::port::PortError;

/// Maximum SSID length in bytes (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length in bytes
pub const MAX_PASSWORD_LEN: usize = 63;

/// Maximum networks returned by one scan
pub const MAX_SCAN_RESULTS: usize = 16;

/// Radio connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed,
    /// Radio is running as an access point
    AccessPoint,
}

/// One scan result
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WifiNetwork {
    pub ssid: String<MAX_SSID_LEN>,
    /// Signal strength in dBm
    pub rssi: i8,
    /// Whether the network requires a passphrase
    pub secure: bool,
}

impl WifiNetwork {
    /// Build a scan entry, truncating over-long SSIDs
    pub fn new(ssid: &str, rssi: i8, secure: bool) -> Self {
        let mut name = String::new();
        for c in ssid.chars() {
            if name.push(c).is_err() {
                break;
            }
        }
        Self {
            ssid: name,
            rssi,
            secure,
        }
    }
}

/// Why a credential pair was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CredentialError {
    /// SSID is empty
    EmptySsid,
    /// SSID longer than [`MAX_SSID_LEN`]
    SsidTooLong,
    /// Passphrase longer than [`MAX_PASSWORD_LEN`]
    PasswordTooLong,
}

/// Station credentials
///
/// Always valid once constructed. An empty password is allowed and means
/// an open network.
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: String<MAX_SSID_LEN>,
    password: String<MAX_PASSWORD_LEN>,
}

impl WifiCredentials {
    /// Validate and build a credential pair
    pub fn new(ssid: &str, password: &str) -> Result<Self, CredentialError> {
        if ssid.is_empty() {
            return Err(CredentialError::EmptySsid);
        }
        let mut s = String::new();
        s.push_str(ssid).map_err(|_| CredentialError::SsidTooLong)?;
        let mut p = String::new();
        p.push_str(password)
            .map_err(|_| CredentialError::PasswordTooLong)?;
        Ok(Self {
            ssid: s,
            password: p,
        })
    }

    pub fn ssid(&self) -> &str {
        self.ssid.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Whether this is an open network
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// Never print the passphrase
impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid.as_str())
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for WifiCredentials {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "WifiCredentials {{ ssid: {}, password: <redacted> }}", self.ssid.as_str());
    }
}

/// Radio primitives
///
/// Implemented by the board's WiFi stack binding. Station and AP control
/// are non-blocking; connection progress is polled through [`Self::status`].
pub trait WifiRadio {
    /// Current connection status
    fn status(&mut self) -> WifiStatus;

    /// Begin joining a network
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), PortError>;

    /// Leave the current network
    fn disconnect(&mut self);

    /// Fill `out` with up to `limit` visible networks
    fn scan(&mut self, out: &mut Vec<WifiNetwork, MAX_SCAN_RESULTS>, limit: usize);

    /// Bring up a soft AP and return its address
    fn start_access_point(&mut self, ssid: &str) -> Result<Ipv4Addr, PortError>;

    /// Tear down the soft AP
    fn stop_access_point(&mut self);

    /// Current address, if any
    fn ip_address(&self) -> Option<Ipv4Addr>;

    /// Station MAC address
    fn mac_address(&self) -> [u8; 6];
}
