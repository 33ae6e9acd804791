//! Scripted collaborators for host tests

use core::net::Ipv4Addr;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use heapless::Vec as BoundedVec;
use tenbin_hal::{
    Accel, Button, HardwarePort, PortError, WifiCredentials, WifiNetwork, WifiStatus,
    MAX_SCAN_RESULTS,
};
use tenbin_portal::{CaptivePortal, Outcome, Request};

use crate::provisioning::{PortalTarget, PumpReport, WebCollaborator, WebError};
use crate::render::{DisplayBackend, DisplayError, Label, RenderLock};

/// Hardware port whose behaviour is set field by field
#[derive(Debug)]
pub struct ScriptedPort {
    pub pressed: [bool; 2],
    pub edges: [bool; 2],
    pub accel: Accel,
    pub level: u8,
    pub voltage: f32,
    pub brightness: u8,
    pub mac: [u8; 6],
    pub stored: Option<WifiCredentials>,
    pub status: WifiStatus,
    /// Polls of `wifi_status` before a connect succeeds; `None` never does
    pub connect_after_polls: Option<u32>,
    /// Polls before a connect reports failure
    pub fail_connect_after_polls: Option<u32>,
    polls: u32,
    pub connects: Vec<String>,
    pub disconnects: u32,
    pub ap_result: Result<Ipv4Addr, PortError>,
    pub ap_ssid: Option<String>,
    pub ap_attempts: u32,
    pub ap_stops: u32,
    pub restart_result: Result<(), PortError>,
    pub restarts: u32,
    pub accel_reads: u32,
    pub battery_reads: u32,
}

impl ScriptedPort {
    pub fn new() -> Self {
        Self {
            pressed: [false; 2],
            edges: [false; 2],
            accel: Accel::new(0.0, 0.0, 1.0),
            level: 75,
            voltage: 3.9,
            brightness: 128,
            mac: [0x24, 0x0A, 0xC4, 0x12, 0xF1, 0xC8],
            stored: None,
            status: WifiStatus::Disconnected,
            connect_after_polls: Some(0),
            fail_connect_after_polls: None,
            polls: 0,
            connects: Vec::new(),
            disconnects: 0,
            ap_result: Ok(Ipv4Addr::new(192, 168, 4, 1)),
            ap_ssid: None,
            ap_attempts: 0,
            ap_stops: 0,
            restart_result: Err(PortError::RestartUnavailable),
            restarts: 0,
            accel_reads: 0,
            battery_reads: 0,
        }
    }

    pub fn with_credentials(ssid: &str, password: &str) -> Self {
        let mut port = Self::new();
        port.stored = Some(WifiCredentials::new(ssid, password).unwrap());
        port
    }

    pub fn press(&mut self, button: Button) {
        self.pressed[button.index()] = true;
        self.edges[button.index()] = true;
    }

    pub fn release(&mut self, button: Button) {
        self.pressed[button.index()] = false;
    }
}

impl HardwarePort for ScriptedPort {
    fn update(&mut self) {}

    fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }

    fn was_pressed(&mut self, button: Button) -> bool {
        core::mem::take(&mut self.edges[button.index()])
    }

    fn read_accel(&mut self) -> Result<Accel, PortError> {
        self.accel_reads += 1;
        Ok(self.accel)
    }

    fn battery_level(&mut self) -> Result<u8, PortError> {
        self.battery_reads += 1;
        Ok(self.level)
    }

    fn battery_voltage(&mut self) -> Result<f32, PortError> {
        Ok(self.voltage)
    }

    fn brightness(&self) -> u8 {
        self.brightness
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
    }

    fn device_id(&self) -> [u8; 6] {
        self.mac
    }

    fn has_stored_credentials(&mut self) -> bool {
        self.stored.is_some()
    }

    fn load_credentials(&mut self) -> Option<WifiCredentials> {
        self.stored.clone()
    }

    fn save_credentials(&mut self, credentials: &WifiCredentials) -> Result<(), PortError> {
        self.stored = Some(credentials.clone());
        Ok(())
    }

    fn clear_credentials(&mut self) -> Result<(), PortError> {
        self.stored = None;
        Ok(())
    }

    fn wifi_status(&mut self) -> WifiStatus {
        if self.status == WifiStatus::Connecting {
            self.polls += 1;
            if self.fail_connect_after_polls.is_some_and(|n| self.polls >= n) {
                self.status = WifiStatus::Failed;
            } else if self.connect_after_polls.is_some_and(|n| self.polls >= n) {
                self.status = WifiStatus::Connected;
            }
        }
        self.status
    }

    fn connect(&mut self, credentials: &WifiCredentials) -> Result<(), PortError> {
        self.connects.push(credentials.ssid().to_string());
        self.polls = 0;
        self.status = if self.connect_after_polls == Some(0) {
            WifiStatus::Connected
        } else {
            WifiStatus::Connecting
        };
        Ok(())
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.status = WifiStatus::Disconnected;
    }

    fn scan_networks(&mut self, limit: usize) -> BoundedVec<WifiNetwork, MAX_SCAN_RESULTS> {
        let mut networks = BoundedVec::new();
        for (ssid, rssi) in [("HomeWiFi_2.4G", -45), ("Office_Network", -62)]
            .into_iter()
            .take(limit)
        {
            let _ = networks.push(WifiNetwork::new(ssid, rssi, true));
        }
        networks
    }

    fn start_access_point(&mut self, ssid: &str) -> Result<Ipv4Addr, PortError> {
        self.ap_attempts += 1;
        let address = self.ap_result?;
        self.ap_ssid = Some(ssid.to_string());
        Ok(address)
    }

    fn stop_access_point(&mut self) {
        self.ap_stops += 1;
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        (self.status == WifiStatus::Connected).then_some(Ipv4Addr::new(192, 168, 1, 100))
    }

    fn restart_device(&mut self) -> Result<(), PortError> {
        self.restarts += 1;
        self.restart_result
    }
}

/// Delay that only accumulates the requested time
#[derive(Debug, Default)]
pub struct NoDelay {
    pub total_ms: u32,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += ns / 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms;
    }
}

/// Web collaborator backed by the real portal logic, fed raw requests
pub struct ScriptedWeb {
    pub start_result: Result<(), WebError>,
    pub starts: Vec<(Ipv4Addr, u16, u16, String)>,
    pub stops: u32,
    pub responses: Vec<u16>,
    inbox: Vec<String>,
    portal: Option<CaptivePortal>,
}

impl ScriptedWeb {
    pub fn new() -> Self {
        Self {
            start_result: Ok(()),
            starts: Vec::new(),
            stops: 0,
            responses: Vec::new(),
            inbox: Vec::new(),
            portal: None,
        }
    }

    /// Queue a raw HTTP request for the next pump
    pub fn submit(&mut self, raw: &str) {
        self.inbox.push(raw.to_string());
    }
}

impl WebCollaborator for ScriptedWeb {
    fn start(&mut self, target: &PortalTarget<'_>) -> Result<(), WebError> {
        self.start_result?;
        self.starts.push((
            target.address,
            target.http_port,
            target.dns_port,
            target.redirect_url.to_string(),
        ));
        self.portal = Some(CaptivePortal::new(target.address, target.redirect_url));
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.portal = None;
    }

    fn pump<P: HardwarePort, M: RawMutex>(
        &mut self,
        port: &mut P,
        surface: &RenderLock<M>,
    ) -> PumpReport {
        let mut report = PumpReport::default();
        let Some(portal) = self.portal.as_mut() else {
            return report;
        };

        for raw in self.inbox.drain(..) {
            let request = Request::parse(raw.as_bytes()).unwrap();
            let exchange = portal.handle(&request, |limit| port.scan_networks(limit));
            self.responses.push(exchange.response.status.code());
            report.served += 1;
            match exchange.outcome {
                Outcome::Accepted => {
                    report.accepted += 1;
                    surface.update(|s| s.set(Label::Status, "Credentials received"));
                }
                Outcome::Rejected(_) => report.rejected += 1,
                _ => {}
            }
        }
        report
    }

    fn take_credentials(&mut self) -> Option<WifiCredentials> {
        self.portal.as_mut()?.take_credentials()
    }
}

/// Display that records every presented frame
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub frames: u32,
    pub labels: Vec<(Label, String)>,
    pub qr: Option<String>,
    pub fail: bool,
}

impl DisplayBackend for RecordingDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Communication);
        }
        self.labels.clear();
        self.qr = None;
        Ok(())
    }

    fn draw_label(&mut self, label: Label, text: &str) -> Result<(), DisplayError> {
        self.labels.push((label, text.to_string()));
        Ok(())
    }

    fn draw_qr(&mut self, payload: &str) -> Result<(), DisplayError> {
        self.qr = Some(payload.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.frames += 1;
        Ok(())
    }
}
