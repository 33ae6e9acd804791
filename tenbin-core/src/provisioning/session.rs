//! Provisioning session state

use core::fmt::Write;
use core::net::Ipv4Addr;

use heapless::String;
use tenbin_hal::MAX_SSID_LEN;

/// Maximum portal URL length ("http://255.255.255.255/")
pub const PORTAL_URL_LEN: usize = 32;

/// Derive the access point name from the device MAC
///
/// The last two MAC bytes are appended as zero-padded upper-case hex, so
/// the name is stable across reboots.
pub fn access_point_ssid(prefix: &str, mac: [u8; 6]) -> String<MAX_SSID_LEN> {
    let mut ssid = String::new();
    let _ = write!(ssid, "{}{:02X}{:02X}", prefix, mac[4], mac[5]);
    ssid
}

/// Live provisioning session
///
/// Exists only while the provisioning screen is active. The `configured`
/// latch goes false to true at most once.
#[derive(Debug, Clone)]
pub struct ProvisioningSession {
    ap_ssid: String<MAX_SSID_LEN>,
    address: Ipv4Addr,
    portal_url: String<PORTAL_URL_LEN>,
    configured: bool,
    prompt_highlighted: bool,
    last_blink_ms: Option<u32>,
}

impl ProvisioningSession {
    pub fn new(ap_ssid: String<MAX_SSID_LEN>, address: Ipv4Addr) -> Self {
        let mut portal_url = String::new();
        let _ = write!(portal_url, "http://{}/", address);
        Self {
            ap_ssid,
            address,
            portal_url,
            configured: false,
            prompt_highlighted: true,
            last_blink_ms: None,
        }
    }

    pub fn ap_ssid(&self) -> &str {
        self.ap_ssid.as_str()
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn portal_url(&self) -> &str {
        self.portal_url.as_str()
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Set the configured latch
    ///
    /// Returns true only on the false to true transition.
    pub fn latch(&mut self) -> bool {
        if self.configured {
            return false;
        }
        self.configured = true;
        true
    }

    /// Advance the prompt blink
    ///
    /// Returns the new highlight state when it toggles.
    pub fn blink(&mut self, now_ms: u32, period_ms: u32) -> Option<bool> {
        match self.last_blink_ms {
            None => {
                self.last_blink_ms = Some(now_ms);
                None
            }
            Some(last) if now_ms.wrapping_sub(last) >= period_ms => {
                self.last_blink_ms = Some(now_ms);
                self.prompt_highlighted = !self.prompt_highlighted;
                Some(self.prompt_highlighted)
            }
            Some(_) => None,
        }
    }
}
