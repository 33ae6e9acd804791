//! System-level board controls

use crate::port::PortError;

/// Board services that are neither sensors nor radio
pub trait SystemControl {
    /// Reset the MCU
    ///
    /// On success this does not return in practice; `Ok(())` means the
    /// reset has been scheduled.
    fn restart(&mut self) -> Result<(), PortError>;

    /// Drive the display backlight (0 = off, 255 = full)
    fn set_backlight(&mut self, level: u8);
}
