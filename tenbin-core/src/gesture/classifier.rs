//! Gesture classifier implementation

use tenbin_hal::Button;

use crate::config::InputConfig;

/// Discrete gesture edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// Button went down
    PressStarted,
    /// Button released before the long-press threshold
    ShortRelease,
    /// Button held past the threshold (fires once per press)
    LongPress,
}

/// Per-button gesture state
///
/// `long_press_triggered` is only ever true while `press_start_ms` is set;
/// both are cleared together exactly once per release.
#[derive(Debug, Clone, Default)]
pub struct ButtonGestureState {
    is_pressed: bool,
    press_start_ms: Option<u32>,
    long_press_triggered: bool,
    pending_short_release: bool,
    pending_long_press: bool,
}

impl ButtonGestureState {
    pub const fn new() -> Self {
        Self {
            is_pressed: false,
            press_start_ms: None,
            long_press_triggered: false,
            pending_short_release: false,
            pending_long_press: false,
        }
    }

    /// Feed one raw sample
    ///
    /// Pending edges from the previous sample that nobody consumed are
    /// dropped first, so a stale flag can never drive a later transition.
    pub fn update(&mut self, pressed: bool, now_ms: u32, threshold_ms: u32) -> Option<Gesture> {
        self.pending_short_release = false;
        self.pending_long_press = false;

        match (self.is_pressed, pressed) {
            (false, true) => {
                self.is_pressed = true;
                self.press_start_ms = Some(now_ms);
                self.long_press_triggered = false;
                Some(Gesture::PressStarted)
            }
            (true, true) => {
                let start = self.press_start_ms?;
                if !self.long_press_triggered && now_ms.wrapping_sub(start) >= threshold_ms {
                    self.long_press_triggered = true;
                    self.pending_long_press = true;
                    Some(Gesture::LongPress)
                } else {
                    None
                }
            }
            (true, false) => {
                let consumed = self.long_press_triggered;
                self.is_pressed = false;
                self.press_start_ms = None;
                self.long_press_triggered = false;
                if consumed {
                    None
                } else {
                    self.pending_short_release = true;
                    Some(Gesture::ShortRelease)
                }
            }
            (false, false) => None,
        }
    }

    /// Consume a pending short release
    pub fn take_short_release(&mut self) -> bool {
        core::mem::take(&mut self.pending_short_release)
    }

    /// Consume a pending long press
    pub fn take_long_press(&mut self) -> bool {
        core::mem::take(&mut self.pending_long_press)
    }

    pub fn is_pressed(&self) -> bool {
        self.is_pressed
    }

    pub fn long_press_triggered(&self) -> bool {
        self.long_press_triggered
    }

    /// How long the current press has lasted
    pub fn held_ms(&self, now_ms: u32) -> Option<u32> {
        self.press_start_ms.map(|start| now_ms.wrapping_sub(start))
    }
}

/// Gesture classifier for both buttons
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    states: [ButtonGestureState; 2],
    thresholds_ms: [u32; 2],
}

impl GestureClassifier {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            states: [ButtonGestureState::new(), ButtonGestureState::new()],
            thresholds_ms: [config.long_press_a_ms, config.long_press_b_ms],
        }
    }

    /// Long-press threshold for a button
    pub fn threshold_ms(&self, button: Button) -> u32 {
        self.thresholds_ms[button.index()]
    }

    /// Feed one tick of input for a button
    ///
    /// `edge` is the port's single-consume press latch. A latched edge with
    /// the button already up means the whole press happened between two
    /// ticks; it is classified as a short release.
    pub fn update(&mut self, button: Button, pressed: bool, edge: bool, now_ms: u32) -> Option<Gesture> {
        let threshold = self.thresholds_ms[button.index()];
        let state = &mut self.states[button.index()];

        if edge && !pressed && !state.is_pressed() {
            state.update(true, now_ms, threshold);
            return state.update(false, now_ms, threshold);
        }

        state.update(pressed, now_ms, threshold)
    }

    pub fn take_short_release(&mut self, button: Button) -> bool {
        self.states[button.index()].take_short_release()
    }

    pub fn take_long_press(&mut self, button: Button) -> bool {
        self.states[button.index()].take_long_press()
    }

    pub fn state(&self, button: Button) -> &ButtonGestureState {
        &self.states[button.index()]
    }

    pub fn held_ms(&self, button: Button, now_ms: u32) -> Option<u32> {
        self.states[button.index()].held_ms(now_ms)
    }

    /// Return every button to idle
    pub fn reset(&mut self) {
        self.states = [ButtonGestureState::new(), ButtonGestureState::new()];
    }
}
