//! Render surface, render lock and screen drawing
//!
//! Screens draw into a label-slot [`Surface`], never to pixels. A
//! [`DisplayBackend`] turns the surface into whatever the panel needs.

mod backend;
mod lock;
pub mod screens;
mod surface;

pub use backend::{present, DisplayBackend, DisplayError};
pub use lock::RenderLock;
pub use surface::{Label, Surface, LABEL_COUNT, LINE_LEN, QR_PAYLOAD_LEN};
