//! Screen definitions and transition table

use tenbin_hal::Button;

use super::events::{Action, Reaction, ScreenEvent};
use crate::error::CoreError;

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ScreenState {
    /// AP + captive portal waiting for credentials
    ProvisioningSetup = 0,
    /// Splash, waiting for Button A
    Start = 1,
    /// Live telemetry
    Main = 2,
    /// Firmware version and build time
    Version = 3,
}

impl TryFrom<u8> for ScreenState {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ScreenState::ProvisioningSetup),
            1 => Ok(ScreenState::Start),
            2 => Ok(ScreenState::Main),
            3 => Ok(ScreenState::Version),
            other => Err(CoreError::UnknownScreenState(other)),
        }
    }
}

impl ScreenState {
    /// Raw discriminant
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Process an event and return the resulting reaction
    ///
    /// `None` means the event has no meaning on this screen.
    pub fn transition(self, event: ScreenEvent) -> Option<Reaction> {
        use Button::*;
        use ScreenEvent::*;
        use ScreenState::*;

        let reaction = match (self, event) {
            (ProvisioningSetup, CredentialsConfigured) => {
                Reaction::new(Start, Action::CompleteProvisioning)
            }

            (Start, ShortRelease(A)) => Reaction::new(Main, Action::Render),

            (Main, LongPress(A)) => Reaction::new(Version, Action::Render),
            (Main, LongPress(B)) => Reaction::new(ProvisioningSetup, Action::FactoryReset),
            (Main, ShortRelease(A)) => Reaction::new(Main, Action::AcknowledgePrimary),
            (Main, ShortRelease(B)) => Reaction::new(Main, Action::CycleBrightness),

            (Version, ShortRelease(A)) => Reaction::new(Main, Action::Render),

            _ => return None,
        };

        Some(reaction)
    }
}
