//! Application tick loop
//!
//! [`App`] wires the gesture classifier, screen controller, telemetry
//! sampler and provisioning coordinator around one hardware port. An
//! external driver calls [`App::boot`] once and [`App::tick`] periodically.
//!
//! Per tick:
//! 1. Poll the hardware port
//! 2. Update gesture state for both buttons
//! 3. Sample telemetry (throttled)
//! 4. On the provisioning screen, service the captive portal
//! 5. Dispatch gesture events to the screen controller
//! 6. Refresh labels and present the surface

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use tenbin_hal::{Button, HardwarePort, WifiCredentials};

use crate::config::AppConfig;
use crate::error::CoreError;
use crate::gesture::GestureClassifier;
use crate::provisioning::{BootDecision, Completion, ProvisioningCoordinator, WebCollaborator};
use crate::render::{self, screens, DisplayBackend, RenderLock};
use crate::state::{Action, ScreenController, ScreenEvent, ScreenState};
use crate::telemetry::{TelemetrySample, TelemetrySampler};

/// Firmware identity shown on the version screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VersionInfo {
    pub app: &'static str,
    /// Build timestamp, "YYYY/MM/DD HH:MM"
    pub build: &'static str,
}

impl VersionInfo {
    pub const fn new(app: &'static str, build: &'static str) -> Self {
        Self { app, build }
    }
}

/// Application lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lifecycle {
    Running,
    /// A device restart was requested; further ticks are no-ops
    Restarting,
}

/// The device application
pub struct App<P, W, D, T, M>
where
    P: HardwarePort,
    W: WebCollaborator,
    D: DisplayBackend,
    T: DelayNs,
    M: RawMutex,
{
    config: AppConfig,
    port: P,
    web: W,
    display: D,
    delay: T,
    classifier: GestureClassifier,
    controller: ScreenController,
    sampler: TelemetrySampler,
    coordinator: ProvisioningCoordinator,
    surface: RenderLock<M>,
    version: VersionInfo,
    lifecycle: Lifecycle,
    pending_credentials: Option<WifiCredentials>,
    hold_feedback_s: Option<u32>,
}

impl<P, W, D, T, M> App<P, W, D, T, M>
where
    P: HardwarePort,
    W: WebCollaborator,
    D: DisplayBackend,
    T: DelayNs,
    M: RawMutex,
{
    /// Assemble the application
    ///
    /// The screen is only meaningful after [`Self::boot`], which lets the
    /// provisioning coordinator choose it.
    pub fn new(config: AppConfig, port: P, web: W, display: D, delay: T, version: VersionInfo) -> Self {
        Self {
            classifier: GestureClassifier::new(&config.input),
            controller: ScreenController::new(ScreenState::ProvisioningSetup),
            sampler: TelemetrySampler::new(&config.telemetry),
            coordinator: ProvisioningCoordinator::new(config.provisioning.clone()),
            surface: RenderLock::new(),
            lifecycle: Lifecycle::Running,
            pending_credentials: None,
            hold_feedback_s: None,
            config,
            port,
            web,
            display,
            delay,
            version,
        }
    }

    /// Run the startup workflow and draw the first screen
    pub fn boot(&mut self) {
        info!("Booting {} ({})", self.version.app, self.version.build);

        self.classifier.reset();
        self.pending_credentials = None;
        self.hold_feedback_s = None;

        match self.coordinator.startup(&mut self.port, &mut self.delay) {
            BootDecision::Connected => {
                self.controller.enter(ScreenState::Start);
                self.surface.update(screens::draw_start);
            }
            BootDecision::Provision => {
                self.controller.enter(ScreenState::ProvisioningSetup);
                if let Err(e) = self
                    .coordinator
                    .enter_setup(&mut self.port, &mut self.web, &self.surface)
                {
                    error!("Provisioning unavailable this boot: {:?}", e);
                }
            }
        }

        self.present();
    }

    /// Advance one tick
    pub fn tick(&mut self, now_ms: u32) -> Lifecycle {
        if self.lifecycle == Lifecycle::Restarting {
            return self.lifecycle;
        }

        self.port.update();
        for button in Button::ALL {
            let pressed = self.port.is_pressed(button);
            let edge = self.port.was_pressed(button);
            self.classifier.update(button, pressed, edge, now_ms);
        }

        let refresh = self.sampler.tick(&mut self.port);

        if self.controller.current() == ScreenState::ProvisioningSetup {
            if let Some(credentials) =
                self.coordinator
                    .service(&mut self.port, &mut self.web, &self.surface, now_ms)
            {
                self.pending_credentials = Some(credentials);
                self.dispatch(ScreenEvent::CredentialsConfigured);
            }
        }

        for button in Button::ALL {
            if self.lifecycle != Lifecycle::Running {
                break;
            }
            if self.classifier.take_long_press(button) {
                self.dispatch(ScreenEvent::LongPress(button));
            }
            if self.classifier.take_short_release(button) {
                self.dispatch(ScreenEvent::ShortRelease(button));
            }
        }

        if self.lifecycle == Lifecycle::Running {
            self.update_hold_feedback(now_ms);
            if self.controller.current() == ScreenState::Main && refresh.any() {
                let sample = self.sampler.sample();
                self.surface
                    .update(|s| screens::draw_telemetry(s, &sample));
            }
        }

        self.present();
        self.lifecycle
    }

    fn dispatch(&mut self, event: ScreenEvent) {
        let Some(reaction) = self.controller.dispatch(event) else {
            return;
        };

        match reaction.action {
            Action::Render => self.render_current(),
            Action::CompleteProvisioning => {
                let Some(credentials) = self.pending_credentials.take() else {
                    warn!("Provisioning completed without credentials");
                    self.render_current();
                    return;
                };
                match self.coordinator.complete(
                    &mut self.port,
                    &mut self.web,
                    &self.surface,
                    &credentials,
                ) {
                    Completion::Restarting => self.lifecycle = Lifecycle::Restarting,
                    Completion::Continued => self.render_current(),
                }
            }
            Action::FactoryReset => {
                match self.coordinator.factory_reset(&mut self.port, &self.surface) {
                    Completion::Restarting => self.lifecycle = Lifecycle::Restarting,
                    // No restart available: run startup again in place
                    Completion::Continued => self.boot(),
                }
            }
            Action::AcknowledgePrimary => {
                self.surface
                    .update(|s| screens::draw_status(s, "Button A pressed!"));
            }
            Action::CycleBrightness => {
                let level = self
                    .port
                    .brightness()
                    .wrapping_add(self.config.provisioning.brightness_step);
                self.port.set_brightness(level);
                debug!("Brightness {}", level);
                self.surface.update(|s| {
                    s.set_fmt(render::Label::Status, format_args!("Brightness: {}", level))
                });
            }
        }
    }

    fn render_current(&mut self) {
        let sample = self.sampler.sample();
        let version = self.version;
        let coordinator = &self.coordinator;
        let mac = self.port.device_id();

        self.surface.update(|s| match self.controller.current() {
            ScreenState::Start => screens::draw_start(s),
            ScreenState::Main => screens::draw_main(s, &sample),
            ScreenState::Version => screens::draw_version(s, &version),
            ScreenState::ProvisioningSetup => {
                if let Some(session) = coordinator.session() {
                    screens::draw_setup(s, session.ap_ssid(), session.portal_url());
                } else if coordinator.failure().is_some() {
                    screens::draw_setup_failed(s, &coordinator.ap_ssid(mac));
                }
            }
        });
    }

    /// "Hold B: n/3s" countdown while the reset button is down on Main
    fn update_hold_feedback(&mut self, now_ms: u32) {
        let state = self.classifier.state(Button::B);
        let held = match (self.controller.current(), state.held_ms(now_ms)) {
            (ScreenState::Main, Some(held)) if !state.long_press_triggered() => held,
            _ => {
                self.hold_feedback_s = None;
                return;
            }
        };

        let elapsed_s = held / 1000 + 1;
        if self.hold_feedback_s == Some(elapsed_s) {
            return;
        }
        self.hold_feedback_s = Some(elapsed_s);

        let total_s = self.classifier.threshold_ms(Button::B).div_ceil(1000);
        self.surface
            .update(|s| screens::draw_hold_feedback(s, elapsed_s.min(total_s), total_s));
    }

    fn present(&mut self) {
        if let Some(snapshot) = self.surface.take_dirty() {
            if let Err(e) = render::present(&mut self.display, &snapshot) {
                warn!("Display present failed: {:?}", e);
                self.surface.mark_dirty();
            }
        }
    }

    /// Jump to a screen by raw discriminant (debug console)
    ///
    /// Unknown values are reported and leave the screen unchanged. A
    /// provisioning failure stays terminal: the setup screen shows it again
    /// instead of retrying the access point.
    pub fn force_screen(&mut self, raw: u8) -> Result<ScreenState, CoreError> {
        let screen = self.controller.enter_raw(raw)?;
        if screen == ScreenState::ProvisioningSetup
            && self.coordinator.session().is_none()
            && self.coordinator.failure().is_none()
        {
            if let Err(e) = self
                .coordinator
                .enter_setup(&mut self.port, &mut self.web, &self.surface)
            {
                error!("Provisioning unavailable: {:?}", e);
            }
        } else {
            self.render_current();
        }
        self.present();
        Ok(screen)
    }

    pub fn screen(&self) -> ScreenState {
        self.controller.current()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn telemetry(&self) -> TelemetrySample {
        self.sampler.sample()
    }

    pub fn surface(&self) -> &RenderLock<M> {
        &self.surface
    }

    pub fn coordinator(&self) -> &ProvisioningCoordinator {
        &self.coordinator
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn web_mut(&mut self) -> &mut W {
        &mut self.web
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Label;
    use crate::test_support::{NoDelay, RecordingDisplay, ScriptedPort, ScriptedWeb};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use tenbin_hal::PortError;

    type TestApp = App<ScriptedPort, ScriptedWeb, RecordingDisplay, NoDelay, NoopRawMutex>;

    const VERSION: VersionInfo = VersionInfo::new("tenbin 0.1.0", "2026/10/16 09:30");

    fn app(port: ScriptedPort) -> TestApp {
        App::new(
            AppConfig::default(),
            port,
            ScriptedWeb::new(),
            RecordingDisplay::default(),
            NoDelay::default(),
            VERSION,
        )
    }

    fn label(app: &TestApp, label: Label) -> String {
        app.surface().read(|s| s.get(label).to_string())
    }

    /// Press and release between two ticks, returning the next free time
    fn tap(app: &mut TestApp, button: Button, now_ms: u32) -> u32 {
        app.port_mut().press(button);
        app.tick(now_ms);
        app.port_mut().release(button);
        app.tick(now_ms + 10);
        now_ms + 20
    }

    fn booted_on_main() -> (TestApp, u32) {
        let mut app = app(ScriptedPort::with_credentials("Home", "secret"));
        app.boot();
        let now = tap(&mut app, Button::A, 0);
        assert_eq!(app.screen(), ScreenState::Main);
        (app, now)
    }

    #[test]
    fn test_first_boot_provisions_then_persists() {
        let mut app = app(ScriptedPort::new());
        app.boot();

        assert_eq!(app.screen(), ScreenState::ProvisioningSetup);
        assert_eq!(app.port().ap_ssid.as_deref(), Some("M5Stick-F1C8"));
        assert_eq!(label(&app, Label::Detail), "http://192.168.4.1/");
        assert_eq!(
            app.surface().read(|s| s.qr_payload().map(|p| p.to_string())),
            Some("http://192.168.4.1/".to_string())
        );

        app.web_mut()
            .submit("GET /config?ssid=Home&password=secret HTTP/1.1\r\n\r\n");
        app.tick(10);
        assert_eq!(app.web_mut().responses, vec![200]);
        assert_eq!(app.screen(), ScreenState::ProvisioningSetup);

        assert_eq!(app.tick(20), Lifecycle::Running);
        assert_eq!(app.screen(), ScreenState::Start);
        let stored = app.port().stored.clone().unwrap();
        assert_eq!(stored.ssid(), "Home");
        assert_eq!(stored.password(), "secret");
        assert_eq!(app.web_mut().stops, 1);
        assert_eq!(app.port().ap_stops, 1);
        assert_eq!(app.port().connects, vec!["Home".to_string()]);
        assert_eq!(label(&app, Label::Title), "IoT Weight\nMonitor");
    }

    #[test]
    fn test_provisioning_with_restart_stops_ticking() {
        let mut port = ScriptedPort::new();
        port.restart_result = Ok(());
        let mut app = app(port);
        app.boot();

        app.web_mut()
            .submit("GET /config?ssid=Home&password=secret HTTP/1.1\r\n\r\n");
        app.tick(10);
        assert_eq!(app.tick(20), Lifecycle::Restarting);
        assert_eq!(app.port().restarts, 1);
        assert!(app.port().stored.is_some());

        let frames = app.display().frames;
        assert_eq!(app.tick(30), Lifecycle::Restarting);
        assert_eq!(app.display().frames, frames);
    }

    #[test]
    fn test_stored_network_boots_to_start() {
        let mut app = app(ScriptedPort::with_credentials("Home", "secret"));
        app.boot();

        assert_eq!(app.screen(), ScreenState::Start);
        assert_eq!(app.port().ap_attempts, 0);
        assert!(app.web_mut().starts.is_empty());
        assert_eq!(label(&app, Label::Instruction), "Press A to start");
        assert!(app.display().frames >= 1);
    }

    #[test]
    fn test_idle_ticks_keep_screen_and_frame() {
        let mut app = app(ScriptedPort::with_credentials("Home", "secret"));
        app.boot();
        let frames = app.display().frames;

        for t in 1..=50 {
            assert_eq!(app.tick(t * 10), Lifecycle::Running);
            assert_eq!(app.screen(), ScreenState::Start);
        }
        assert_eq!(app.display().frames, frames);
    }

    #[test]
    fn test_unreachable_network_falls_back_to_setup() {
        let mut port = ScriptedPort::with_credentials("Home", "secret");
        port.connect_after_polls = None;
        let mut app = app(port);
        app.boot();

        assert_eq!(app.screen(), ScreenState::ProvisioningSetup);
        assert_eq!(app.port().ap_attempts, 1);
    }

    #[test]
    fn test_hold_b_on_main_factory_resets() {
        let (mut app, t0) = booted_on_main();

        app.port_mut().press(Button::B);
        app.tick(t0);
        assert_eq!(label(&app, Label::Status), "Hold B: 1/3s");
        app.tick(t0 + 1000);
        assert_eq!(label(&app, Label::Status), "Hold B: 2/3s");
        app.tick(t0 + 2000);
        assert_eq!(label(&app, Label::Status), "Hold B: 3/3s");
        assert_eq!(app.screen(), ScreenState::Main);

        app.tick(t0 + 3000);
        assert_eq!(app.port().stored, None);
        assert_eq!(app.port().restarts, 1);
        // Restart unavailable: startup runs again and lands in setup
        assert_eq!(app.screen(), ScreenState::ProvisioningSetup);
        assert_eq!(app.port().ap_attempts, 1);
        assert_eq!(app.lifecycle(), Lifecycle::Running);

        // Releasing afterwards is not a short press on the new screen
        app.port_mut().release(Button::B);
        app.tick(t0 + 3100);
        assert_eq!(app.screen(), ScreenState::ProvisioningSetup);
    }

    #[test]
    fn test_invalid_submission_stays_in_setup() {
        let mut app = app(ScriptedPort::new());
        app.boot();

        app.web_mut().submit("GET /config?ssid=Home HTTP/1.1\r\n\r\n");
        app.tick(10);
        app.tick(20);

        assert_eq!(app.web_mut().responses, vec![400]);
        assert_eq!(app.screen(), ScreenState::ProvisioningSetup);
        assert!(!app.coordinator().session().unwrap().is_configured());
        assert!(app.port().stored.is_none());
        assert!(label(&app, Label::Status).starts_with("Missing SSID or password"));
    }

    #[test]
    fn test_buttons_ignored_during_setup() {
        let mut app = app(ScriptedPort::new());
        app.boot();

        let now = tap(&mut app, Button::A, 10);
        let now = tap(&mut app, Button::B, now);
        app.port_mut().press(Button::B);
        app.tick(now);
        app.tick(now + 3500);

        assert_eq!(app.screen(), ScreenState::ProvisioningSetup);
        assert_eq!(app.port().restarts, 0);
    }

    #[test]
    fn test_short_b_cycles_brightness() {
        let (mut app, now) = booted_on_main();
        assert_eq!(app.port().brightness, 128);

        let now = tap(&mut app, Button::B, now);
        assert_eq!(app.port().brightness, 192);
        assert_eq!(label(&app, Label::Status), "Brightness: 192");

        tap(&mut app, Button::B, now);
        assert_eq!(app.port().brightness, 0);
        assert_eq!(app.screen(), ScreenState::Main);
    }

    #[test]
    fn test_short_a_on_main_acknowledges() {
        let (mut app, now) = booted_on_main();
        tap(&mut app, Button::A, now);
        assert_eq!(app.screen(), ScreenState::Main);
        assert_eq!(label(&app, Label::Status), "Button A pressed!");
    }

    #[test]
    fn test_version_screen_round_trip() {
        let (mut app, now) = booted_on_main();

        app.port_mut().press(Button::A);
        app.tick(now);
        app.tick(now + 1500);
        assert_eq!(app.screen(), ScreenState::Version);
        assert_eq!(
            label(&app, Label::Body),
            "APP: tenbin 0.1.0\nBuild: 2026/10/16 09:30"
        );

        // The release after a long press is not a short release
        app.port_mut().release(Button::A);
        app.tick(now + 1510);
        assert_eq!(app.screen(), ScreenState::Version);

        tap(&mut app, Button::A, now + 1520);
        assert_eq!(app.screen(), ScreenState::Main);
    }

    #[test]
    fn test_main_shows_telemetry() {
        let (mut app, now) = booted_on_main();
        app.port_mut().level = 42;
        app.port_mut().voltage = 3.5;

        // Battery refreshes every 100 ticks
        for i in 0..100 {
            app.tick(now + i * 10);
        }

        assert_eq!(label(&app, Label::Battery), "Battery: 42% 3.50V");
        assert!(label(&app, Label::Accel).starts_with("Accel:\n  X: 0.00"));
    }

    #[test]
    fn test_force_screen_rejects_unknown() {
        let (mut app, _) = booted_on_main();
        assert_eq!(app.force_screen(9), Err(CoreError::UnknownScreenState(9)));
        assert_eq!(app.screen(), ScreenState::Main);

        assert_eq!(app.force_screen(3), Ok(ScreenState::Version));
        assert_eq!(label(&app, Label::Title), "Version");
    }

    #[test]
    fn test_ap_failure_leaves_failure_screen() {
        let mut port = ScriptedPort::new();
        port.ap_result = Err(PortError::AccessPoint);
        let mut app = app(port);
        app.boot();

        assert_eq!(app.screen(), ScreenState::ProvisioningSetup);
        assert_eq!(
            app.coordinator().failure(),
            Some(CoreError::AccessPointStartFailure)
        );
        for t in 1..20 {
            app.tick(t * 10);
        }
        assert_eq!(app.port().ap_attempts, 1);
        assert_eq!(label(&app, Label::Status), "AP start failed");
    }

    #[test]
    fn test_forced_setup_after_ap_failure_does_not_retry() {
        let mut port = ScriptedPort::new();
        port.ap_result = Err(PortError::AccessPoint);
        let mut app = app(port);
        app.boot();

        assert_eq!(app.force_screen(3), Ok(ScreenState::Version));
        assert_eq!(label(&app, Label::Title), "Version");

        assert_eq!(app.force_screen(0), Ok(ScreenState::ProvisioningSetup));
        assert_eq!(app.port().ap_attempts, 1);
        assert_eq!(
            app.coordinator().failure(),
            Some(CoreError::AccessPointStartFailure)
        );
        assert_eq!(label(&app, Label::Status), "AP start failed");
    }
}
