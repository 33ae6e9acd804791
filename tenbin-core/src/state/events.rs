//! Screen events and reactions

use tenbin_hal::Button;

use super::screen::ScreenState;

/// Events consumed by the screen state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenEvent {
    /// Button released before its long-press threshold
    ShortRelease(Button),
    /// Button held past its long-press threshold
    LongPress(Button),
    /// Provisioning observed a submitted credential set
    CredentialsConfigured,
}

/// Entry action to run after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Draw the new screen
    Render,
    /// Persist credentials, tear down AP and portal, restart or continue
    CompleteProvisioning,
    /// Clear credentials and restart into provisioning
    FactoryReset,
    /// Status feedback for Button A on the main screen
    AcknowledgePrimary,
    /// Step the backlight level
    CycleBrightness,
}

/// Result of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reaction {
    pub next: ScreenState,
    pub action: Action,
}

impl Reaction {
    pub const fn new(next: ScreenState, action: Action) -> Self {
        Self { next, action }
    }
}
