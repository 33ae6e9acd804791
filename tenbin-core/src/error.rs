//! Error taxonomy
//!
//! None of these unwind: callers inspect the value and pick the next
//! screen. The worst case is always a recognisable screen with feedback.

use tenbin_hal::PortError;

/// Control core errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoreError {
    /// Stored network did not come up within the retry budget; recovered
    /// by falling through to provisioning
    ConnectTimeout,
    /// Access point could not be started; terminal for this boot
    AccessPointStartFailure,
    /// Captive portal could not be started; terminal for this boot
    PortalStartFailure,
    /// Submitted credentials missing a field or out of bounds
    ConfigSubmissionInvalid,
    /// Raw screen discriminant outside the known set
    UnknownScreenState(u8),
    /// Hardware port failure
    Port(PortError),
}

impl From<PortError> for CoreError {
    fn from(e: PortError) -> Self {
        CoreError::Port(e)
    }
}
