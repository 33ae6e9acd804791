//! Display backend trait
//!
//! Defines the interface between the render surface and a physical (or
//! terminal) display. Layout, fonts and QR bitmap generation live behind
//! this trait.

use super::surface::{Label, Surface};

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Display not initialized
    NotInitialized,
    /// Content did not fit
    BufferOverflow,
}

/// Display backend trait
pub trait DisplayBackend {
    /// Clear the entire display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw one label slot
    fn draw_label(&mut self, label: Label, text: &str) -> Result<(), DisplayError>;

    /// Draw a QR code encoding `payload`
    fn draw_qr(&mut self, payload: &str) -> Result<(), DisplayError>;

    /// Flush buffered content to the display
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Check if the display is ready
    fn is_ready(&self) -> bool {
        true
    }
}

/// Draw a full surface
pub fn present<D: DisplayBackend>(display: &mut D, surface: &Surface) -> Result<(), DisplayError> {
    if !display.is_ready() {
        return Err(DisplayError::NotInitialized);
    }

    display.clear()?;
    for (label, text) in surface.labels() {
        display.draw_label(label, text)?;
    }
    if let Some(payload) = surface.qr_payload() {
        display.draw_qr(payload)?;
    }
    display.flush()
}
