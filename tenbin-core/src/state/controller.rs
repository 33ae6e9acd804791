//! Screen controller

use super::events::{Reaction, ScreenEvent};
use super::screen::ScreenState;
use crate::error::CoreError;

/// Owns the current screen
///
/// The current screen is replaced in a single assignment; no intermediate
/// value is ever observable.
#[derive(Debug, Clone)]
pub struct ScreenController {
    current: ScreenState,
}

impl ScreenController {
    /// Create a controller on the screen chosen at startup
    pub fn new(initial: ScreenState) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> ScreenState {
        self.current
    }

    /// Apply an event
    ///
    /// Returns the reaction when the event is meaningful on the current
    /// screen, `None` otherwise.
    pub fn dispatch(&mut self, event: ScreenEvent) -> Option<Reaction> {
        match self.current.transition(event) {
            Some(reaction) => {
                if reaction.next != self.current {
                    info!("Screen {:?} -> {:?}", self.current, reaction.next);
                }
                self.current = reaction.next;
                Some(reaction)
            }
            None => {
                trace!("Ignored {:?} on {:?}", event, self.current);
                None
            }
        }
    }

    /// Move to a screen chosen outside the transition table (boot, recovery)
    pub fn enter(&mut self, screen: ScreenState) {
        if screen != self.current {
            info!("Screen {:?} -> {:?}", self.current, screen);
        }
        self.current = screen;
    }

    /// Move to a screen given by raw discriminant
    ///
    /// Unknown values are reported and leave the current screen in place.
    pub fn enter_raw(&mut self, raw: u8) -> Result<ScreenState, CoreError> {
        match ScreenState::try_from(raw) {
            Ok(screen) => {
                self.enter(screen);
                Ok(screen)
            }
            Err(e) => {
                warn!("Unknown screen state {}, staying on {:?}", raw, self.current);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Action;
    use tenbin_hal::Button;

    #[test]
    fn test_dispatch_updates_current() {
        let mut controller = ScreenController::new(ScreenState::Start);
        let r = controller
            .dispatch(ScreenEvent::ShortRelease(Button::A))
            .unwrap();
        assert_eq!(r.action, Action::Render);
        assert_eq!(controller.current(), ScreenState::Main);
    }

    #[test]
    fn test_ignored_event_keeps_screen() {
        let mut controller = ScreenController::new(ScreenState::Start);
        assert!(controller.dispatch(ScreenEvent::LongPress(Button::A)).is_none());
        assert_eq!(controller.current(), ScreenState::Start);
    }

    #[test]
    fn test_unknown_raw_state_is_non_fatal() {
        let mut controller = ScreenController::new(ScreenState::Main);
        assert_eq!(
            controller.enter_raw(42),
            Err(CoreError::UnknownScreenState(42))
        );
        assert_eq!(controller.current(), ScreenState::Main);

        assert_eq!(controller.enter_raw(3), Ok(ScreenState::Version));
        assert_eq!(controller.current(), ScreenState::Version);
    }

    #[test]
    fn test_no_spontaneous_reentry() {
        // The same transition only repeats when the event repeats
        let mut controller = ScreenController::new(ScreenState::Start);
        let first = controller.dispatch(ScreenEvent::ShortRelease(Button::A));
        assert!(first.is_some());
        let again = controller.dispatch(ScreenEvent::ShortRelease(Button::A));
        assert_ne!(first, again);

        // Events with no meaning on Main never move it
        for _ in 0..10 {
            assert!(controller.dispatch(ScreenEvent::CredentialsConfigured).is_none());
            assert_eq!(controller.current(), ScreenState::Main);
        }
    }
}
