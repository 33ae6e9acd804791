//! Provisioning coordinator

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use heapless::String;
use tenbin_hal::{HardwarePort, PortError, WifiCredentials, WifiStatus, MAX_SSID_LEN};

use super::session::{access_point_ssid, ProvisioningSession};
use super::web::{PortalTarget, WebCollaborator};
use crate::config::ProvisioningConfig;
use crate::error::CoreError;
use crate::render::{screens, Label, RenderLock};

/// Where startup should land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootDecision {
    /// Stored network is up
    Connected,
    /// No usable network; run the captive portal
    Provision,
}

/// How a restart request was honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// The device is resetting; nothing more should run this boot
    Restarting,
    /// Restart is unavailable; the caller continues in place
    Continued,
}

/// Provisioning coordinator
///
/// Owns the provisioning session and drives the hardware port and web
/// collaborator through the bootstrap workflow.
#[derive(Debug, Clone)]
pub struct ProvisioningCoordinator {
    config: ProvisioningConfig,
    session: Option<ProvisioningSession>,
    failure: Option<CoreError>,
}

impl ProvisioningCoordinator {
    pub fn new(config: ProvisioningConfig) -> Self {
        Self {
            config,
            session: None,
            failure: None,
        }
    }

    /// Active session, if the portal is up
    pub fn session(&self) -> Option<&ProvisioningSession> {
        self.session.as_ref()
    }

    /// Terminal failure recorded for this boot
    pub fn failure(&self) -> Option<CoreError> {
        self.failure
    }

    /// Access point name for the device with this MAC
    pub fn ap_ssid(&self, mac: [u8; 6]) -> String<MAX_SSID_LEN> {
        access_point_ssid(&self.config.ap_ssid_prefix, mac)
    }

    /// Decide the initial screen
    ///
    /// Tries stored credentials first. A connection timeout is not an
    /// error from the caller's point of view; it just means provisioning.
    pub fn startup<P: HardwarePort, D: DelayNs>(
        &mut self,
        port: &mut P,
        delay: &mut D,
    ) -> BootDecision {
        let Some(credentials) = port.load_credentials() else {
            info!("No stored WiFi credentials");
            return BootDecision::Provision;
        };

        match self.connect_stored(port, delay, &credentials) {
            Ok(()) => {
                info!("Connected to {}", credentials.ssid());
                BootDecision::Connected
            }
            Err(e) => {
                warn!("Stored network unavailable: {:?}", e);
                BootDecision::Provision
            }
        }
    }

    /// Connect and poll status up to the configured attempt budget
    fn connect_stored<P: HardwarePort, D: DelayNs>(
        &self,
        port: &mut P,
        delay: &mut D,
        credentials: &WifiCredentials,
    ) -> Result<(), CoreError> {
        info!("Connecting to {}", credentials.ssid());
        port.connect(credentials)?;

        for attempt in 0..self.config.connect_attempts {
            match port.wifi_status() {
                WifiStatus::Connected => return Ok(()),
                WifiStatus::Failed => {
                    debug!("Connect failed after {} polls", attempt);
                    break;
                }
                _ => delay.delay_ms(self.config.connect_poll_ms),
            }
        }

        if port.wifi_status() == WifiStatus::Connected {
            return Ok(());
        }

        port.disconnect();
        Err(CoreError::ConnectTimeout)
    }

    /// Start the access point and captive portal
    ///
    /// Failure is terminal for this boot: the screen shows it and nothing
    /// retries.
    pub fn enter_setup<P, W, M>(
        &mut self,
        port: &mut P,
        web: &mut W,
        surface: &RenderLock<M>,
    ) -> Result<(), CoreError>
    where
        P: HardwarePort,
        W: WebCollaborator,
        M: RawMutex,
    {
        self.session = None;
        self.failure = None;

        let ap_ssid = self.ap_ssid(port.device_id());
        port.disconnect();

        let address = match port.start_access_point(&ap_ssid) {
            Ok(address) => address,
            Err(e) => {
                error!("Access point {} failed to start: {:?}", ap_ssid.as_str(), e);
                return Err(self.fail(surface, ap_ssid.as_str(), CoreError::AccessPointStartFailure));
            }
        };
        info!("Access point {} up at {:?}", ap_ssid.as_str(), address.octets());

        let session = ProvisioningSession::new(ap_ssid, address);
        let target = PortalTarget {
            address,
            http_port: self.config.http_port,
            dns_port: self.config.dns_port,
            redirect_url: session.portal_url(),
        };
        if let Err(e) = web.start(&target) {
            error!("Captive portal failed to start: {:?}", e);
            port.stop_access_point();
            return Err(self.fail(surface, session.ap_ssid(), CoreError::PortalStartFailure));
        }
        info!(
            "Captive portal on port {} (DNS {})",
            self.config.http_port, self.config.dns_port
        );

        surface.update(|s| screens::draw_setup(s, session.ap_ssid(), session.portal_url()));
        self.session = Some(session);
        Ok(())
    }

    fn fail<M: RawMutex>(&mut self, surface: &RenderLock<M>, ap_ssid: &str, error: CoreError) -> CoreError {
        surface.update(|s| screens::draw_setup_failed(s, ap_ssid));
        self.failure = Some(error);
        error
    }

    /// One provisioning tick
    ///
    /// Polls the latch first, then pumps the portal; a submission pumped
    /// on one tick is therefore picked up on the next. Returns the
    /// credentials exactly once per session.
    pub fn service<P, W, M>(
        &mut self,
        port: &mut P,
        web: &mut W,
        surface: &RenderLock<M>,
        now_ms: u32,
    ) -> Option<WifiCredentials>
    where
        P: HardwarePort,
        W: WebCollaborator,
        M: RawMutex,
    {
        let session = self.session.as_mut()?;

        if let Some(credentials) = web.take_credentials() {
            if session.latch() {
                info!("Credentials submitted for {}", credentials.ssid());
                return Some(credentials);
            }
            debug!("Dropping repeat submission for {}", credentials.ssid());
        }

        let report = web.pump(port, surface);
        if report.served > 0 {
            trace!("Portal served {} requests", report.served);
        }
        if report.rejected > 0 {
            warn!(
                "{:?}: {} submission(s) rejected",
                CoreError::ConfigSubmissionInvalid,
                report.rejected
            );
            surface.update(|s| screens::draw_status(s, "Missing SSID or password\nTry again"));
        }

        if let Some(highlighted) = session.blink(now_ms, self.config.status_blink_ms) {
            surface.update(|s| screens::draw_setup_prompt(s, highlighted));
        }

        None
    }

    /// Persist submitted credentials and leave provisioning
    pub fn complete<P, W, M>(
        &mut self,
        port: &mut P,
        web: &mut W,
        surface: &RenderLock<M>,
        credentials: &WifiCredentials,
    ) -> Completion
    where
        P: HardwarePort,
        W: WebCollaborator,
        M: RawMutex,
    {
        surface.update(|s| screens::draw_status(s, "Config saved!\nRebooting..."));

        if let Err(e) = port.save_credentials(credentials) {
            error!("Failed to persist credentials: {:?}", e);
        }

        port.stop_access_point();
        web.stop();
        self.session = None;
        info!("Captive portal stopped");

        let completion = restart(port);
        if completion == Completion::Continued {
            if let Err(e) = port.connect(credentials) {
                warn!("Connect to {} refused: {:?}", credentials.ssid(), e);
            }
        }
        completion
    }

    /// Clear stored credentials and restart into provisioning
    ///
    /// Touches only storage and the restart hook, so it works with the
    /// network in any state.
    pub fn factory_reset<P: HardwarePort, M: RawMutex>(
        &mut self,
        port: &mut P,
        surface: &RenderLock<M>,
    ) -> Completion {
        warn!("Factory reset requested");
        surface.update(|s| s.set(Label::Status, "WiFi Reset!\nRebooting..."));

        port.disconnect();
        if let Err(e) = port.clear_credentials() {
            error!("Failed to clear credentials: {:?}", e);
        }

        restart(port)
    }
}

fn restart<P: HardwarePort>(port: &mut P) -> Completion {
    match port.restart_device() {
        Ok(()) => {
            info!("Restarting device");
            Completion::Restarting
        }
        Err(PortError::RestartUnavailable) => {
            info!("Restart unavailable, continuing in place");
            Completion::Continued
        }
        Err(e) => {
            error!("Restart failed: {:?}", e);
            Completion::Continued
        }
    }
}
