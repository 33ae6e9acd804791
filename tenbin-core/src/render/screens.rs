//! Screen drawing
//!
//! Each function rewrites the surface for one screen. Callers hold the
//! render lock for the duration of the call.

use super::surface::{Label, Surface};
use crate::app::VersionInfo;
use crate::telemetry::TelemetrySample;

pub fn draw_start(surface: &mut Surface) {
    surface.clear();
    surface.set(Label::Title, "IoT Weight\nMonitor");
    surface.set(Label::Instruction, "Press A to start");
}

pub fn draw_main(surface: &mut Surface, sample: &TelemetrySample) {
    surface.clear();
    surface.set(Label::Title, "M5StickC Plus2");
    surface.set(Label::Instruction, "Press A or B");
    draw_telemetry(surface, sample);
}

/// Refresh only the telemetry labels of the main screen
pub fn draw_telemetry(surface: &mut Surface, sample: &TelemetrySample) {
    let accel = sample.accel;
    surface.set_fmt(
        Label::Accel,
        format_args!(
            "Accel:\n  X: {:.2}\n  Y: {:.2}\n  Z: {:.2}",
            accel.x, accel.y, accel.z
        ),
    );
    surface.set_fmt(
        Label::Battery,
        format_args!(
            "Battery: {}% {:.2}V",
            sample.battery.level, sample.battery.voltage
        ),
    );
}

pub fn draw_version(surface: &mut Surface, version: &VersionInfo) {
    surface.clear();
    surface.set(Label::Title, "Version");
    surface.set_fmt(
        Label::Body,
        format_args!("APP: {}\nBuild: {}", version.app, version.build),
    );
    surface.set(Label::Instruction, "Press A to return");
}

/// Provisioning screen: AP name, portal address and a QR code for it
pub fn draw_setup(surface: &mut Surface, ap_ssid: &str, portal_url: &str) {
    surface.clear();
    surface.set(Label::Title, "WiFi Setup");
    surface.set_fmt(Label::Body, format_args!("SSID: {}", ap_ssid));
    surface.set(Label::Detail, portal_url);
    surface.set_qr_payload(Some(portal_url));
    draw_setup_prompt(surface, true);
}

/// Blinking scan prompt on the provisioning screen
pub fn draw_setup_prompt(surface: &mut Surface, highlighted: bool) {
    let text = if highlighted {
        "► Scan QR code\nwith smartphone"
    } else {
        "  Scan QR code..."
    };
    surface.set(Label::Instruction, text);
}

/// Provisioning screen when the access point could not start
pub fn draw_setup_failed(surface: &mut Surface, ap_ssid: &str) {
    surface.clear();
    surface.set(Label::Title, "WiFi Setup");
    surface.set_fmt(Label::Body, format_args!("SSID: {}", ap_ssid));
    surface.set(Label::Status, "AP start failed");
}

pub fn draw_status(surface: &mut Surface, text: &str) {
    surface.set(Label::Status, text);
}

/// Countdown feedback while the reset button is held
pub fn draw_hold_feedback(surface: &mut Surface, elapsed_s: u32, total_s: u32) {
    surface.set_fmt(
        Label::Status,
        format_args!("Hold B: {}/{}s", elapsed_s, total_s),
    );
}
