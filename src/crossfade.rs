//! Four-digit multiplexing with a soft crossfade between segment patterns.
//!
//! Each digit position keeps three masks: the segments that are steadily
//! on, the segments fading in, and the segments fading out. At the start
//! of a digit's window the panel shows the incoming pattern; at the ramp
//! cutoff it switches back to the outgoing one. As the shared ramp
//! threshold climbs, the incoming portion of every window grows and the
//! whole display fades to its new state at once.

use crate::constants::{
    BRIGHTNESS_BASE_DUTY, BRIGHTNESS_STEP_DUTY, DIGIT_COUNT, RAMP_FLOOR, RAMP_STEP,
};

/// Segment transition state for one digit position.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitSlot {
    /// Segments currently shown at full duty.
    pub on: u8,
    /// Segments fading in.
    pub ramp_up: u8,
    /// Segments fading out.
    pub ramp_down: u8,
}

impl DigitSlot {
    /// Mask driven at the start of this digit's window: the pattern the
    /// slot is transitioning toward.
    #[must_use]
    pub const fn lit_mask(&self) -> u8 {
        (self.on | self.ramp_up) & !self.ramp_down
    }

    /// Mask driven after the ramp cutoff: the outgoing pattern.
    #[must_use]
    pub const fn cutoff_mask(&self) -> u8 {
        (self.on & !self.ramp_up) | self.ramp_down
    }

    /// Fold the in-flight transition into the steady state, then derive
    /// the rising and falling sets against `target`.
    fn retarget(&mut self, target: u8) {
        self.on |= self.ramp_up;
        self.on &= !self.ramp_down;
        let diff = self.on ^ target;
        self.ramp_up = diff & !self.on;
        self.ramp_down = diff & self.on;
    }
}

/// What to drive for one digit position: which cell to activate and the
/// segment bus pattern.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitDrive {
    pub cell: u8,
    pub segments: u8,
}

/// Panel duty (x/256 of a digit window) for a brightness level.
#[must_use]
pub fn duty_for_level(level: u8) -> u8 {
    let duty =
        u16::from(BRIGHTNESS_BASE_DUTY).saturating_add(u16::from(level) * u16::from(BRIGHTNESS_STEP_DUTY));
    u8::try_from(duty.min(u16::from(u8::MAX))).unwrap_or(u8::MAX)
}

/// The four digit slots, the multiplex cursor, and the shared ramp.
pub struct FadePanel {
    slots: [DigitSlot; DIGIT_COUNT],
    /// Next position to select.
    cursor: usize,
    /// Position currently driven.
    lit: usize,
    /// Shared crossfade duty threshold (x/256 of a digit window).
    ramp: u8,
    /// Brightness-dependent window duty (x/256).
    duty: u8,
}

impl FadePanel {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [DigitSlot {
                on: 0,
                ramp_up: 0,
                ramp_down: 0,
            }; DIGIT_COUNT],
            cursor: 0,
            lit: 0,
            ramp: RAMP_FLOOR,
            duty: BRIGHTNESS_BASE_DUTY,
        }
    }

    /// Shared ramp threshold, for scheduling the cutoff point.
    #[must_use]
    pub const fn ramp(&self) -> u8 {
        self.ramp
    }

    /// Current window duty, for scheduling the brightness gate.
    #[must_use]
    pub const fn duty(&self) -> u8 {
        self.duty
    }

    /// One digit position's transition state.
    #[expect(clippy::indexing_slicing, reason = "index < DIGIT_COUNT is the caller's contract")]
    #[must_use]
    pub fn slot(&self, index: usize) -> DigitSlot {
        self.slots[index]
    }

    /// Apply a brightness level; the ramp is re-clamped under the new
    /// ceiling.
    pub fn set_brightness(&mut self, level: u8) {
        self.duty = duty_for_level(level);
        self.ramp = self.ramp.clamp(RAMP_FLOOR, self.ramp_ceiling());
    }

    /// Digit-select: drive the cursor position and advance, wrapping after
    /// the last digit.
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing,
        clippy::integer_division_remainder_used,
        reason = "cursor stays below DIGIT_COUNT by the modulo"
    )]
    pub fn select(&mut self) -> DigitDrive {
        self.lit = self.cursor;
        self.cursor = (self.cursor + 1) % DIGIT_COUNT;
        DigitDrive {
            cell: self.lit as u8,
            segments: self.slots[self.lit].lit_mask(),
        }
    }

    /// Ramp cutoff: the crossover rewrite for the lit digit. `None` once
    /// the ramp has reached its ceiling and the fade is complete.
    #[expect(clippy::indexing_slicing, reason = "lit is always a cursor value")]
    pub fn cutoff(&mut self) -> Option<DigitDrive> {
        (self.ramp < self.ramp_ceiling()).then(|| DigitDrive {
            cell: self.lit as u8,
            segments: self.slots[self.lit].cutoff_mask(),
        })
    }

    /// Cycle end: the caller blanks the panel for the brightness gate; the
    /// shared ramp steps once per full sweep, when the cursor has wrapped
    /// back to the first digit.
    pub fn cycle_end(&mut self) {
        if self.cursor == 0 {
            self.ramp = self
                .ramp
                .saturating_add(RAMP_STEP)
                .clamp(RAMP_FLOOR, self.ramp_ceiling());
        }
    }

    /// Point every position at a new segment pattern.
    ///
    /// A request matching what the panel is already showing (or fading
    /// toward) is a no-op, so repeated refresh requests do not pin the
    /// ramp at its floor. Otherwise in-flight transitions are committed,
    /// the rising and falling sets are rederived, and the fade restarts
    /// from the floor for the whole display at once.
    pub fn retarget(&mut self, targets: [u8; DIGIT_COUNT]) {
        if self
            .slots
            .iter()
            .zip(&targets)
            .all(|(slot, &target)| slot.lit_mask() == target)
        {
            return;
        }
        for (slot, target) in self.slots.iter_mut().zip(targets) {
            slot.retarget(target);
        }
        self.ramp = RAMP_FLOOR;
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "duty is at least BRIGHTNESS_BASE_DUTY, well above RAMP_FLOOR"
    )]
    const fn ramp_ceiling(&self) -> u8 {
        self.duty - RAMP_FLOOR
    }
}

impl Default for FadePanel {
    fn default() -> Self {
        Self::new()
    }
}
