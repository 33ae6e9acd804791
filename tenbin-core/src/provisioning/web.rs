//! Web collaborator contract
//!
//! The captive portal transport (HTTP + wildcard DNS) lives outside the
//! core. The coordinator only starts and stops it, pumps it once per
//! provisioning tick, and polls for submitted credentials.

use core::net::Ipv4Addr;

use embassy_sync::blocking_mutex::raw::RawMutex;
use tenbin_hal::{HardwarePort, WifiCredentials};

use crate::render::RenderLock;

/// Where the portal should listen and redirect to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalTarget<'a> {
    /// Access point address; every DNS answer points here
    pub address: Ipv4Addr,
    pub http_port: u16,
    pub dns_port: u16,
    /// Captive-portal probes are redirected to this URL
    pub redirect_url: &'a str,
}

/// Outcome of one pump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PumpReport {
    /// Requests answered (HTTP and DNS)
    pub served: u16,
    /// Credential submissions accepted
    pub accepted: u16,
    /// Credential submissions rejected (missing or invalid fields)
    pub rejected: u16,
}

/// Portal start failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WebError {
    /// Could not bind the HTTP or DNS socket
    Bind,
    /// Transport failure
    Io,
}

/// Captive portal collaborator
pub trait WebCollaborator {
    /// Start serving
    fn start(&mut self, target: &PortalTarget<'_>) -> Result<(), WebError>;

    /// Stop serving and release sockets
    fn stop(&mut self);

    /// Service pending requests without blocking
    ///
    /// The port is lent for network scans. Any change to the surface must
    /// go through `surface`.
    fn pump<P: HardwarePort, M: RawMutex>(
        &mut self,
        port: &mut P,
        surface: &RenderLock<M>,
    ) -> PumpReport;

    /// Take the submitted credentials, if a valid submission arrived
    fn take_credentials(&mut self) -> Option<WifiCredentials>;
}
