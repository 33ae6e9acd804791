//! Startup-time port selection

use core::net::Ipv4Addr;

use heapless::Vec;
use tenbin_core::config::PortVariant;
use tenbin_hal::{
    Accel, Button, HardwarePort, PortError, WifiCredentials, WifiNetwork, WifiStatus,
    MAX_SCAN_RESULTS,
};

/// One of the two port variants, chosen once from configuration
pub enum SelectedPort<E, P> {
    Emulated(E),
    Physical(P),
}

impl<E, P> SelectedPort<E, P> {
    /// Build the port `variant` names; only that variant's builder runs
    pub fn from_variant<Err>(
        variant: PortVariant,
        emulated: impl FnOnce() -> Result<E, Err>,
        physical: impl FnOnce() -> Result<P, Err>,
    ) -> Result<Self, Err> {
        info!("Hardware port: {:?}", variant);
        match variant {
            PortVariant::Emulated => emulated().map(SelectedPort::Emulated),
            PortVariant::Physical => physical().map(SelectedPort::Physical),
        }
    }

    pub fn variant(&self) -> PortVariant {
        match self {
            SelectedPort::Emulated(_) => PortVariant::Emulated,
            SelectedPort::Physical(_) => PortVariant::Physical,
        }
    }
}

macro_rules! delegate {
    ($self:ident, $port:ident => $body:expr) => {
        match $self {
            SelectedPort::Emulated($port) => $body,
            SelectedPort::Physical($port) => $body,
        }
    };
}

impl<E: HardwarePort, P: HardwarePort> HardwarePort for SelectedPort<E, P> {
    fn update(&mut self) {
        delegate!(self, port => port.update())
    }

    fn is_pressed(&self, button: Button) -> bool {
        delegate!(self, port => port.is_pressed(button))
    }

    fn was_pressed(&mut self, button: Button) -> bool {
        delegate!(self, port => port.was_pressed(button))
    }

    fn read_accel(&mut self) -> Result<Accel, PortError> {
        delegate!(self, port => port.read_accel())
    }

    fn battery_level(&mut self) -> Result<u8, PortError> {
        delegate!(self, port => port.battery_level())
    }

    fn battery_voltage(&mut self) -> Result<f32, PortError> {
        delegate!(self, port => port.battery_voltage())
    }

    fn brightness(&self) -> u8 {
        delegate!(self, port => port.brightness())
    }

    fn set_brightness(&mut self, level: u8) {
        delegate!(self, port => port.set_brightness(level))
    }

    fn device_id(&self) -> [u8; 6] {
        delegate!(self, port => port.device_id())
    }

    fn has_stored_credentials(&mut self) -> bool {
        delegate!(self, port => port.has_stored_credentials())
    }

    fn load_credentials(&mut self) -> Option<WifiCredentials> {
        delegate!(self, port => port.load_credentials())
    }

    fn save_credentials(&mut self, credentials: &WifiCredentials) -> Result<(), PortError> {
        delegate!(self, port => port.save_credentials(credentials))
    }

    fn clear_credentials(&mut self) -> Result<(), PortError> {
        delegate!(self, port => port.clear_credentials())
    }

    fn wifi_status(&mut self) -> WifiStatus {
        delegate!(self, port => port.wifi_status())
    }

    fn connect(&mut self, credentials: &WifiCredentials) -> Result<(), PortError> {
        delegate!(self, port => port.connect(credentials))
    }

    fn disconnect(&mut self) {
        delegate!(self, port => port.disconnect())
    }

    fn scan_networks(&mut self, limit: usize) -> Vec<WifiNetwork, MAX_SCAN_RESULTS> {
        delegate!(self, port => port.scan_networks(limit))
    }

    fn start_access_point(&mut self, ssid: &str) -> Result<Ipv4Addr, PortError> {
        delegate!(self, port => port.start_access_point(ssid))
    }

    fn stop_access_point(&mut self) {
        delegate!(self, port => port.stop_access_point())
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        delegate!(self, port => port.ip_address())
    }

    fn restart_device(&mut self) -> Result<(), PortError> {
        delegate!(self, port => port.restart_device())
    }
}
