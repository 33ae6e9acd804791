//! M5StickC-class hardware port
//!
//! Buttons are active-low GPIOs. The MPU6886 and AXP192 share one I2C
//! bus. WiFi, flash and reset come from the board support crate through
//! [`WifiRadio`], [`CredentialStore`] and [`SystemControl`].

use core::net::Ipv4Addr;

use embedded_hal::digital::InputPin;
use embedded_hal::i2c::I2c;
use heapless::Vec;
use tenbin_hal::{
    Accel, Button, CredentialStore, HardwarePort, PortError, SystemControl, WifiCredentials,
    WifiNetwork, WifiRadio, WifiStatus, MAX_SCAN_RESULTS,
};

use crate::imu::{Mpu6886, WHO_AM_I_VALUE};
use crate::input::ButtonLatch;
use crate::pmic::{self, Axp192};

/// Physical board port
pub struct M5StickPort<A, B, I, R, S, C> {
    button_a: A,
    button_b: B,
    i2c: I,
    radio: R,
    store: S,
    system: C,
    imu: Mpu6886,
    pmic: Axp192,
    buttons: ButtonLatch,
    brightness: u8,
}

impl<A, B, I, R, S, C> M5StickPort<A, B, I, R, S, C>
where
    A: InputPin,
    B: InputPin,
    I: I2c,
    R: WifiRadio,
    S: CredentialStore,
    C: SystemControl,
{
    pub fn new(button_a: A, button_b: B, i2c: I, radio: R, store: S, system: C) -> Self {
        Self {
            button_a,
            button_b,
            i2c,
            radio,
            store,
            system,
            imu: Mpu6886::default(),
            pmic: Axp192::default(),
            buttons: ButtonLatch::new(),
            brightness: 128,
        }
    }

    /// Bring up the IMU and backlight
    ///
    /// A wrong `WHO_AM_I` is logged but not fatal; reads will simply
    /// return whatever the part reports.
    pub fn init(&mut self) -> Result<(), PortError> {
        let who = self.imu.init(&mut self.i2c).map_err(|_| {
            error!("IMU init failed");
            PortError::Sensor
        })?;
        if who == WHO_AM_I_VALUE {
            info!("IMU (MPU6886) initialized");
        } else {
            warn!("Unexpected IMU WHO_AM_I {:#x}", who);
        }

        self.system.set_backlight(self.brightness);
        Ok(())
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }
}

fn sample<P: InputPin>(pin: &mut P, previous: bool) -> bool {
    // Active low; a read error keeps the last level
    pin.is_low().unwrap_or(previous)
}

impl<A, B, I, R, S, C> HardwarePort for M5StickPort<A, B, I, R, S, C>
where
    A: InputPin,
    B: InputPin,
    I: I2c,
    R: WifiRadio,
    S: CredentialStore,
    C: SystemControl,
{
    fn update(&mut self) {
        let a = sample(&mut self.button_a, self.buttons.is_pressed(Button::A));
        let b = sample(&mut self.button_b, self.buttons.is_pressed(Button::B));
        self.buttons.set(Button::A, a);
        self.buttons.set(Button::B, b);
    }

    fn is_pressed(&self, button: Button) -> bool {
        self.buttons.is_pressed(button)
    }

    fn was_pressed(&mut self, button: Button) -> bool {
        self.buttons.take_edge(button)
    }

    fn read_accel(&mut self) -> Result<Accel, PortError> {
        self.imu
            .read_accel(&mut self.i2c)
            .map_err(|_| PortError::Sensor)
    }

    fn battery_level(&mut self) -> Result<u8, PortError> {
        self.battery_voltage().map(pmic::battery_percent)
    }

    fn battery_voltage(&mut self) -> Result<f32, PortError> {
        self.pmic
            .battery_voltage(&mut self.i2c)
            .map_err(|_| PortError::Sensor)
    }

    fn brightness(&self) -> u8 {
        self.brightness
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
        self.system.set_backlight(level);
    }

    fn device_id(&self) -> [u8; 6] {
        self.radio.mac_address()
    }

    fn has_stored_credentials(&mut self) -> bool {
        self.store.is_configured()
    }

    fn load_credentials(&mut self) -> Option<WifiCredentials> {
        self.store.load().unwrap_or_else(|e| {
            warn!("Credential load failed: {:?}", e);
            None
        })
    }

    fn save_credentials(&mut self, credentials: &WifiCredentials) -> Result<(), PortError> {
        self.store.store(credentials)?;
        info!("WiFi configuration saved");
        Ok(())
    }

    fn clear_credentials(&mut self) -> Result<(), PortError> {
        self.store.clear()?;
        info!("WiFi configuration cleared");
        Ok(())
    }

    fn wifi_status(&mut self) -> WifiStatus {
        self.radio.status()
    }

    fn connect(&mut self, credentials: &WifiCredentials) -> Result<(), PortError> {
        self.radio.connect(credentials.ssid(), credentials.password())
    }

    fn disconnect(&mut self) {
        self.radio.disconnect();
    }

    fn scan_networks(&mut self, limit: usize) -> Vec<WifiNetwork, MAX_SCAN_RESULTS> {
        let mut networks = Vec::new();
        self.radio.scan(&mut networks, limit);
        networks.truncate(limit);
        networks
    }

    fn start_access_point(&mut self, ssid: &str) -> Result<Ipv4Addr, PortError> {
        self.radio.start_access_point(ssid)
    }

    fn stop_access_point(&mut self) {
        self.radio.stop_access_point();
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        self.radio.ip_address()
    }

    fn restart_device(&mut self) -> Result<(), PortError> {
        self.system.restart()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulated::MemoryStore;
    use crate::imu::{reg, MPU6886_ADDR};
    use crate::pmic::AXP192_ADDR;
    use crate::test_bus::MockBus;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;

    /// Pin whose level is shared with the test
    #[derive(Clone, Default)]
    struct Pin(Rc<Cell<bool>>);

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl InputPin for Pin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.get())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0.get())
        }
    }

    #[derive(Default)]
    struct Radio {
        status: Option<WifiStatus>,
        joined: Option<(String, String)>,
    }

    impl WifiRadio for Radio {
        fn status(&mut self) -> WifiStatus {
            self.status.unwrap_or(WifiStatus::Disconnected)
        }

        fn connect(&mut self, ssid: &str, password: &str) -> Result<(), PortError> {
            self.joined = Some((ssid.to_string(), password.to_string()));
            self.status = Some(WifiStatus::Connecting);
            Ok(())
        }

        fn disconnect(&mut self) {
            self.status = Some(WifiStatus::Disconnected);
        }

        fn scan(&mut self, out: &mut Vec<WifiNetwork, MAX_SCAN_RESULTS>, limit: usize) {
            for i in 0..limit.min(12) {
                let _ = out.push(WifiNetwork::new(&format!("net{}", i), -50, true));
            }
        }

        fn start_access_point(&mut self, _ssid: &str) -> Result<Ipv4Addr, PortError> {
            Err(PortError::AccessPoint)
        }

        fn stop_access_point(&mut self) {}

        fn ip_address(&self) -> Option<Ipv4Addr> {
            None
        }

        fn mac_address(&self) -> [u8; 6] {
            [0x94, 0xB9, 0x7E, 0x00, 0xAB, 0xCD]
        }
    }

    #[derive(Default)]
    struct System {
        backlight: Vec<u8, 8>,
        restarts: u32,
    }

    impl SystemControl for System {
        fn restart(&mut self) -> Result<(), PortError> {
            self.restarts += 1;
            Ok(())
        }

        fn set_backlight(&mut self, level: u8) {
            let _ = self.backlight.push(level);
        }
    }

    type TestPort = M5StickPort<Pin, Pin, MockBus, Radio, MemoryStore, System>;

    fn port() -> (TestPort, Pin, Pin) {
        // Idle high (pull-up)
        let a = Pin(Rc::new(Cell::new(true)));
        let b = Pin(Rc::new(Cell::new(true)));
        let mut bus = MockBus::new();
        bus.set(MPU6886_ADDR, reg::WHO_AM_I, &[WHO_AM_I_VALUE]);
        bus.set(MPU6886_ADDR, reg::ACCEL_XOUT_H, &[0x00, 0x00, 0x00, 0x00, 0x10, 0x00]);
        bus.set(AXP192_ADDR, 0x78, &[0xFF, 0x0F]);
        let port = M5StickPort::new(
            a.clone(),
            b.clone(),
            bus,
            Radio::default(),
            MemoryStore::new(),
            System::default(),
        );
        (port, a, b)
    }

    #[test]
    fn test_buttons_active_low() {
        let (mut port, a, _b) = port();
        port.update();
        assert!(!port.is_pressed(Button::A));

        a.0.set(false);
        port.update();
        assert!(port.is_pressed(Button::A));
        assert!(port.was_pressed(Button::A));
        assert!(!port.was_pressed(Button::B));

        port.update();
        assert!(!port.was_pressed(Button::A));
    }

    #[test]
    fn test_sensors_over_i2c() {
        let (mut port, _, _) = port();
        port.init().unwrap();
        assert_eq!(port.read_accel().unwrap(), Accel::new(0.0, 0.0, 1.0));

        // 0xFFF counts = 4.5045 V
        assert!((port.battery_voltage().unwrap() - 4.5045).abs() < 1e-3);
        assert_eq!(port.battery_level().unwrap(), 100);
    }

    #[test]
    fn test_brightness_drives_backlight() {
        let (mut port, _, _) = port();
        port.init().unwrap();
        port.set_brightness(192);
        assert_eq!(port.brightness(), 192);
        assert_eq!(port.system.backlight.as_slice(), &[128, 192]);
    }

    #[test]
    fn test_radio_and_store_delegation() {
        let (mut port, _, _) = port();
        assert_eq!(port.device_id(), [0x94, 0xB9, 0x7E, 0x00, 0xAB, 0xCD]);

        let credentials = WifiCredentials::new("Home", "secret").unwrap();
        port.connect(&credentials).unwrap();
        assert_eq!(port.wifi_status(), WifiStatus::Connecting);
        assert_eq!(
            port.radio.joined,
            Some(("Home".to_string(), "secret".to_string()))
        );

        assert_eq!(port.scan_networks(10).len(), 10);
        assert_eq!(port.start_access_point("x"), Err(PortError::AccessPoint));

        port.save_credentials(&credentials).unwrap();
        assert!(port.has_stored_credentials());
        port.clear_credentials().unwrap();
        assert_eq!(port.load_credentials(), None);

        assert_eq!(port.restart_device(), Ok(()));
        assert_eq!(port.system.restarts, 1);
    }
}
