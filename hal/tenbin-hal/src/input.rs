//! Physical buttons

/// The two front-panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Button {
    /// Primary button (big face button)
    A = 0,
    /// Secondary button (side button, doubles as reset)
    B = 1,
}

impl Button {
    /// All buttons in polling order
    pub const ALL: [Button; 2] = [Button::A, Button::B];

    /// Index into per-button arrays
    pub const fn index(self) -> usize {
        self as usize
    }
}
