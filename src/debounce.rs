//! Per-button debounce and long-press state machine.

use crate::constants::{AUTOREPEAT_PERIOD_TICKS, BUTTON_COOLDOWN_TICKS, BUTTON_LONG_PRESS_TICKS};

/// Debounced lifecycle of one physical button.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Idle,
    Active,
    LongPress,
    /// Entered externally when a mode-change combo fires; silent until the
    /// input deasserts.
    Locked,
}

/// A discrete event produced by the debouncer.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Edge-triggered: the press crossed the cooldown threshold this tick.
    Press,
    /// Synthetic press while held in `LongPress`.
    Autorepeat,
}

/// Debouncer for a single button, advanced once per tick.
///
/// Electrical bounce shorter than the cooldown window never produces an
/// event; a held press produces exactly one [`ButtonEvent::Press`] and,
/// past the long-press threshold, periodic [`ButtonEvent::Autorepeat`]s
/// phase-locked to the wall-clock subsecond accumulator rather than to
/// this button's own hold time.
pub struct Debouncer {
    state: ButtonState,
    press_ticks: u16,
}

impl Debouncer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ButtonState::Idle,
            press_ticks: 0,
        }
    }

    /// Current debounced state.
    #[must_use]
    pub const fn state(&self) -> ButtonState {
        self.state
    }

    /// Force the combo lock. Holding the button keeps it silent; only a
    /// release returns it to `Idle`.
    pub fn lock(&mut self) {
        self.state = ButtonState::Locked;
    }

    /// Advance one tick with the polarity-corrected input level.
    ///
    /// `subseconds` is the time-keeping accumulator the autorepeat phase
    /// gate divides; a calibration-nudged negative value is safe.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "The counter is checked against its bound before incrementing."
    )]
    pub fn sample(&mut self, pressed: bool, subseconds: i32) -> Option<ButtonEvent> {
        if !pressed {
            self.state = ButtonState::Idle;
            self.press_ticks = 0;
            return None;
        }

        match self.state {
            ButtonState::Locked => None,
            ButtonState::LongPress => (subseconds.rem_euclid(AUTOREPEAT_PERIOD_TICKS) == 0)
                .then_some(ButtonEvent::Autorepeat),
            ButtonState::Idle | ButtonState::Active => {
                if self.press_ticks < BUTTON_LONG_PRESS_TICKS {
                    self.press_ticks += 1;
                    if self.state == ButtonState::Idle
                        && self.press_ticks >= BUTTON_COOLDOWN_TICKS
                    {
                        self.state = ButtonState::Active;
                        return Some(ButtonEvent::Press);
                    }
                    None
                } else {
                    // Sticky: no event at the transition itself.
                    self.state = ButtonState::LongPress;
                    None
                }
            }
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
