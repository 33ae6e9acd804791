//! Button level and press-edge latching

use tenbin_hal::Button;

/// Level plus single-consume press edge for both buttons
///
/// An edge is latched on every released-to-pressed transition and stays
/// set until taken, so a press that begins and ends between two polls is
/// still observed once.
#[derive(Debug, Clone, Default)]
pub struct ButtonLatch {
    pressed: [bool; 2],
    edges: [bool; 2],
}

impl ButtonLatch {
    pub const fn new() -> Self {
        Self {
            pressed: [false; 2],
            edges: [false; 2],
        }
    }

    /// Record the current level of a button
    pub fn set(&mut self, button: Button, pressed: bool) {
        let i = button.index();
        if pressed && !self.pressed[i] {
            self.edges[i] = true;
        }
        self.pressed[i] = pressed;
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }

    /// Take the latched edge
    pub fn take_edge(&mut self, button: Button) -> bool {
        core::mem::take(&mut self.edges[button.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_consumed_once() {
        let mut latch = ButtonLatch::new();
        latch.set(Button::A, true);
        assert!(latch.is_pressed(Button::A));
        assert!(latch.take_edge(Button::A));
        assert!(!latch.take_edge(Button::A));

        // Holding does not re-latch
        latch.set(Button::A, true);
        assert!(!latch.take_edge(Button::A));
    }

    #[test]
    fn test_tap_between_polls_survives() {
        let mut latch = ButtonLatch::new();
        latch.set(Button::B, true);
        latch.set(Button::B, false);
        assert!(!latch.is_pressed(Button::B));
        assert!(latch.take_edge(Button::B));
    }

    #[test]
    fn test_buttons_independent() {
        let mut latch = ButtonLatch::new();
        latch.set(Button::A, true);
        assert!(!latch.take_edge(Button::B));
        assert!(!latch.is_pressed(Button::B));
    }
}
