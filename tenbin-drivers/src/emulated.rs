//! Emulated hardware port
//!
//! Sensors follow a slow synthetic pattern, the radio connects instantly
//! to whatever it is given, and buttons are driven by the host (keyboard,
//! console or test).

use core::net::Ipv4Addr;

use heapless::Vec;
use tenbin_hal::{
    Accel, Button, CredentialStore, HardwarePort, PortError, StorageError, WifiCredentials,
    WifiNetwork, WifiStatus, MAX_SCAN_RESULTS,
};

use crate::input::ButtonLatch;

/// Battery voltage range used by the emulated gauge
const FULL_VOLTS: f32 = 4.2;
const EMPTY_VOLTS: f32 = 3.0;
/// Updates between 10 mV drops
const DRAIN_EVERY_UPDATES: u32 = 1000;
const DRAIN_VOLTS: f32 = 0.01;
/// Accelerometer phase advance per update (radians)
const PHASE_STEP: f32 = 0.01;

const STATION_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 100);
const AP_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);

/// Networks reported by a scan
const NEARBY: [(&str, i8, bool); 4] = [
    ("HomeWiFi_2.4G", -45, true),
    ("Office_Network", -62, true),
    ("iPhone_Hotspot", -71, true),
    ("Cafe_Guest", -85, false),
];

/// Knobs for the emulated board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulatedOptions {
    pub mac: [u8; 6],
    /// When false, connects stay pending forever
    pub connect_succeeds: bool,
}

impl Default for EmulatedOptions {
    fn default() -> Self {
        Self {
            mac: [0x24, 0x0A, 0xC4, 0x12, 0xF1, 0xC8],
            connect_succeeds: true,
        }
    }
}

/// Emulated hardware port
pub struct EmulatedPort<S> {
    options: EmulatedOptions,
    store: S,
    buttons: ButtonLatch,
    phase: f32,
    accel: Accel,
    voltage: f32,
    drain_counter: u32,
    brightness: u8,
    status: WifiStatus,
    address: Option<Ipv4Addr>,
}

impl<S: CredentialStore> EmulatedPort<S> {
    pub fn new(store: S, options: EmulatedOptions) -> Self {
        info!("Emulated hardware initialized");
        Self {
            options,
            store,
            buttons: ButtonLatch::new(),
            phase: 0.0,
            accel: Accel::new(0.0, 0.0, 1.0),
            voltage: FULL_VOLTS,
            drain_counter: 0,
            brightness: 128,
            status: WifiStatus::Disconnected,
            address: None,
        }
    }

    /// Host input: button went down
    pub fn press(&mut self, button: Button) {
        self.buttons.set(button, true);
    }

    /// Host input: button went up
    pub fn release(&mut self, button: Button) {
        self.buttons.set(button, false);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn voltage(&self) -> f32 {
        self.voltage
    }
}

impl<S: CredentialStore> HardwarePort for EmulatedPort<S> {
    fn update(&mut self) {
        self.phase += PHASE_STEP;
        self.accel = Accel::new(
            libm::sinf(self.phase) * 0.1,
            libm::cosf(self.phase) * 0.1,
            1.0,
        );

        self.drain_counter += 1;
        if self.drain_counter > DRAIN_EVERY_UPDATES {
            self.drain_counter = 0;
            self.voltage -= DRAIN_VOLTS;
            if self.voltage < EMPTY_VOLTS {
                self.voltage = FULL_VOLTS;
            }
        }
    }

    fn is_pressed(&self, button: Button) -> bool {
        self.buttons.is_pressed(button)
    }

    fn was_pressed(&mut self, button: Button) -> bool {
        self.buttons.take_edge(button)
    }

    fn read_accel(&mut self) -> Result<Accel, PortError> {
        Ok(self.accel)
    }

    fn battery_level(&mut self) -> Result<u8, PortError> {
        let level = (self.voltage - EMPTY_VOLTS) / (FULL_VOLTS - EMPTY_VOLTS) * 100.0;
        Ok(level.clamp(0.0, 100.0) as u8)
    }

    fn battery_voltage(&mut self) -> Result<f32, PortError> {
        Ok(self.voltage)
    }

    fn brightness(&self) -> u8 {
        self.brightness
    }

    fn set_brightness(&mut self, level: u8) {
        debug!("Brightness set to {}", level);
        self.brightness = level;
    }

    fn device_id(&self) -> [u8; 6] {
        self.options.mac
    }

    fn has_stored_credentials(&mut self) -> bool {
        self.store.is_configured()
    }

    fn load_credentials(&mut self) -> Option<WifiCredentials> {
        match self.store.load() {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("Credential load failed: {:?}", e);
                None
            }
        }
    }

    fn save_credentials(&mut self, credentials: &WifiCredentials) -> Result<(), PortError> {
        self.store.store(credentials)?;
        info!("Credentials for {} saved", credentials.ssid());
        Ok(())
    }

    fn clear_credentials(&mut self) -> Result<(), PortError> {
        self.store.clear()?;
        info!("Credentials cleared");
        Ok(())
    }

    fn wifi_status(&mut self) -> WifiStatus {
        self.status
    }

    fn connect(&mut self, credentials: &WifiCredentials) -> Result<(), PortError> {
        info!("Connecting to {}", credentials.ssid());
        if self.options.connect_succeeds {
            self.status = WifiStatus::Connected;
            self.address = Some(STATION_ADDRESS);
        } else {
            self.status = WifiStatus::Connecting;
            self.address = None;
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.status != WifiStatus::Disconnected {
            debug!("Disconnected");
        }
        self.status = WifiStatus::Disconnected;
        self.address = None;
    }

    fn scan_networks(&mut self, limit: usize) -> Vec<WifiNetwork, MAX_SCAN_RESULTS> {
        let mut networks = Vec::new();
        for (ssid, rssi, secure) in NEARBY.into_iter().take(limit) {
            if networks.push(WifiNetwork::new(ssid, rssi, secure)).is_err() {
                break;
            }
        }
        debug!("Scan found {} networks", networks.len());
        networks
    }

    fn start_access_point(&mut self, ssid: &str) -> Result<Ipv4Addr, PortError> {
        info!("Access point {} started", ssid);
        self.status = WifiStatus::AccessPoint;
        self.address = Some(AP_ADDRESS);
        Ok(AP_ADDRESS)
    }

    fn stop_access_point(&mut self) {
        if self.status == WifiStatus::AccessPoint {
            self.status = WifiStatus::Disconnected;
            self.address = None;
        }
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        self.address
    }

    fn restart_device(&mut self) -> Result<(), PortError> {
        Err(PortError::RestartUnavailable)
    }
}

/// Volatile credential store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    credentials: Option<WifiCredentials>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(credentials: WifiCredentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&mut self) -> Result<Option<WifiCredentials>, StorageError> {
        Ok(self.credentials.clone())
    }

    fn store(&mut self, credentials: &WifiCredentials) -> Result<(), StorageError> {
        self.credentials = Some(credentials.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.credentials = None;
        Ok(())
    }
}
