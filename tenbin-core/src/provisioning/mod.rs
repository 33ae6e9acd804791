//! WiFi provisioning workflow
//!
//! At startup the coordinator tries stored credentials within a bounded
//! retry budget. Without them, or when the network never comes up, it
//! starts an access point and a captive portal, then waits for a phone to
//! submit new credentials. Those are persisted and the device restarts
//! (or, where it cannot restart itself, continues to the start screen).

mod coordinator;
mod session;
mod web;

pub use coordinator::{BootDecision, Completion, ProvisioningCoordinator};
pub use session::{access_point_ssid, ProvisioningSession, PORTAL_URL_LEN};
pub use web::{PortalTarget, PumpReport, WebCollaborator, WebError};
