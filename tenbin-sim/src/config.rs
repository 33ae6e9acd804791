//! Simulator configuration
//!
//! `tenbin.toml` layout:
//!
//! ```toml
//! [app]                 # tenbin_core::config::AppConfig, every key optional
//! [app.provisioning]
//! http_port = 8080
//!
//! [device]
//! variant = "emulated"
//! mac = "24:0A:C4:12:F1:C8"
//! credentials_file = "wifi.toml"
//! connect_succeeds = true
//!
//! [portal]
//! bind = "127.0.0.1"
//! ```

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tenbin_core::config::{AppConfig, PortVariant};
use tenbin_drivers::EmulatedOptions;

/// Defaults compiled into the binary
pub const EMBEDDED_CONFIG: &str = include_str!("../tenbin.toml");

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub app: AppConfig,
    pub device: DeviceConfig,
    pub portal: PortalConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub variant: PortVariant,
    /// Colon-separated hex, six octets
    pub mac: String,
    /// Relative paths resolve against the state directory
    pub credentials_file: PathBuf,
    pub connect_succeeds: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            variant: PortVariant::Emulated,
            mac: "24:0A:C4:12:F1:C8".to_string(),
            credentials_file: PathBuf::from("wifi.toml"),
            connect_succeeds: true,
        }
    }
}

impl DeviceConfig {
    pub fn emulated_options(&self) -> Result<EmulatedOptions> {
        Ok(EmulatedOptions {
            mac: parse_mac(&self.mac)?,
            connect_succeeds: self.connect_succeeds,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Local address the HTTP and DNS sockets bind to
    pub bind: IpAddr,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([127, 0, 0, 1]),
        }
    }
}

impl SimConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid simulator config")
    }

    /// Load `path`, or the embedded defaults when none is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
            }
            None => Self::parse(EMBEDDED_CONFIG),
        }
    }
}

/// Parse `AA:BB:CC:DD:EE:FF`
pub fn parse_mac(text: &str) -> Result<[u8; 6]> {
    let mut mac = [0u8; 6];
    let mut parts = text.split(':');
    for octet in mac.iter_mut() {
        let part = parts.next().context("MAC address has fewer than six octets")?;
        *octet = u8::from_str_radix(part, 16)
            .with_context(|| format!("bad MAC octet {:?}", part))?;
    }
    if parts.next().is_some() {
        bail!("MAC address has more than six octets");
    }
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_parses() {
        let config = SimConfig::parse(EMBEDDED_CONFIG).unwrap();
        assert_eq!(config.device.variant, PortVariant::Emulated);
        assert_eq!(config.app.provisioning.http_port, 8080);
        assert_eq!(config.app.provisioning.dns_port, 5353);
        assert_eq!(config.app.input.long_press_b_ms, 3000);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(SimConfig::parse("").unwrap(), SimConfig::default());
    }

    #[test]
    fn test_partial_overlay() {
        let config = SimConfig::parse(
            r#"
            [app.input]
            long_press_a_ms = 800

            [device]
            variant = "physical"
            connect_succeeds = false
            "#,
        )
        .unwrap();
        assert_eq!(config.app.input.long_press_a_ms, 800);
        assert_eq!(config.app.input.long_press_b_ms, 3000);
        assert_eq!(config.device.variant, PortVariant::Physical);
        assert!(!config.device.connect_succeeds);
        assert_eq!(config.device.mac, "24:0A:C4:12:F1:C8");
    }

    #[test]
    fn test_unknown_variant_rejected() {
        assert!(SimConfig::parse("[device]\nvariant = \"esp32\"\n").is_err());
    }

    #[test]
    fn test_parse_mac() {
        assert_eq!(
            parse_mac("24:0a:C4:12:F1:C8").unwrap(),
            [0x24, 0x0A, 0xC4, 0x12, 0xF1, 0xC8]
        );
        assert!(parse_mac("24:0A:C4").is_err());
        assert!(parse_mac("24:0A:C4:12:F1:C8:00").is_err());
        assert!(parse_mac("24:0A:C4:12:F1:ZZ").is_err());
    }

    #[test]
    fn test_emulated_options() {
        let device = DeviceConfig {
            mac: "00:11:22:33:44:55".to_string(),
            connect_succeeds: false,
            ..DeviceConfig::default()
        };
        let options = device.emulated_options().unwrap();
        assert_eq!(options.mac, [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert!(!options.connect_succeeds);
    }
}
