//! Wall-clock timekeeping with tick-accumulator calibration.

use crate::constants::{CALIBRATION_STEP_TICKS, CALIBRATION_WINDOW_SECONDS, TICK_HZ};

/// What one tick did to the clock, as seen by the display and mode layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Whole seconds elapsed during this tick. Usually 0 or 1; a large
    /// calibration correction can cascade further.
    pub seconds_elapsed: u8,
    /// A minute boundary was crossed, so the shown time changed.
    pub minute_rolled: bool,
}

/// 24-hour wall clock, owned by the tick handler.
///
/// Fields are always in range: hours 0-23, minutes and seconds 0-59. The
/// subsecond accumulator is signed because the calibration nudge may drive
/// it negative; a negative value simply delays the next second.
pub struct WallClock {
    hours: u8,
    minutes: u8,
    seconds: u8,
    subseconds: i32,
    /// Elapsed-seconds counter for the calibration window. Independent of
    /// the `seconds` field so it keeps running while the clock is edited.
    calibration_seconds: u32,
    time_valid: bool,
}

impl WallClock {
    /// Power-on state: 12:00:00, not yet trustworthy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hours: 12,
            minutes: 0,
            seconds: 0,
            subseconds: 0,
            calibration_seconds: 0,
            time_valid: false,
        }
    }

    #[must_use]
    pub const fn hours(&self) -> u8 {
        self.hours
    }

    #[must_use]
    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    #[must_use]
    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    /// The subsecond accumulator, exposed for the autorepeat phase gate.
    #[must_use]
    pub const fn subseconds(&self) -> i32 {
        self.subseconds
    }

    /// False until the first user edit; the display blinks while false.
    #[must_use]
    pub const fn time_valid(&self) -> bool {
        self.time_valid
    }

    /// Advance one tick, applying `calibration` once per elapsed window.
    ///
    /// The rollover check loops, so a correction that pushes the
    /// accumulator past the threshold more than once advances seconds by
    /// the correct multiple within this same tick. A correction that
    /// pushes it negative is absorbed the same way: the next rollover just
    /// arrives later.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "The accumulator is bounded by TICK_HZ plus one calibration nudge."
    )]
    pub fn tick(&mut self, calibration: i16) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        self.subseconds += 1;

        while self.subseconds >= TICK_HZ {
            self.subseconds -= TICK_HZ;
            outcome.seconds_elapsed = outcome.seconds_elapsed.saturating_add(1);
            if self.advance_second() {
                outcome.minute_rolled = true;
            }

            self.calibration_seconds += 1;
            if self.calibration_seconds >= CALIBRATION_WINDOW_SECONDS {
                self.calibration_seconds = 0;
                self.subseconds += i32::from(calibration) * CALIBRATION_STEP_TICKS;
            }
        }

        outcome
    }

    /// User edit: bump minutes (cascading into hours), zero the seconds,
    /// and mark the displayed time trustworthy.
    pub fn increment_minutes(&mut self) {
        self.roll_minute();
        self.seconds = 0;
        self.time_valid = true;
    }

    /// User edit: bump hours with wraparound at 24, zero the seconds, and
    /// mark the displayed time trustworthy.
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "hours < 24, so the increment cannot overflow."
    )]
    pub fn increment_hours(&mut self) {
        self.hours = (self.hours + 1) % 24;
        self.seconds = 0;
        self.time_valid = true;
    }

    /// Returns true when a minute boundary was crossed.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "seconds < 60 on entry."
    )]
    fn advance_second(&mut self) -> bool {
        self.seconds += 1;
        if self.seconds < 60 {
            return false;
        }
        self.seconds = 0;
        self.roll_minute();
        true
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Both fields are below their terminal value on entry."
    )]
    fn roll_minute(&mut self) {
        self.minutes += 1;
        if self.minutes >= 60 {
            self.minutes = 0;
            self.hours += 1;
            if self.hours >= 24 {
                self.hours = 0;
            }
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::WallClock;
    use crate::constants::{CALIBRATION_WINDOW_SECONDS, TICK_HZ};

    fn tick_seconds(clock: &mut WallClock, seconds: u32, calibration: i16) {
        for _ in 0..(seconds * TICK_HZ as u32) {
            clock.tick(calibration);
        }
    }

    #[test]
    fn boots_at_noon_and_invalid() {
        let clock = WallClock::new();
        assert_eq!(
            (clock.hours(), clock.minutes(), clock.seconds()),
            (12, 0, 0)
        );
        assert!(!clock.time_valid());
    }

    #[test]
    fn fields_stay_in_range_under_a_long_walk() {
        let mut clock = WallClock::new();
        // A coarse walk over two hours in 7-second strides.
        for _ in 0..(2 * 3600 / 7) {
            tick_seconds(&mut clock, 7, 0);
            assert!(clock.hours() < 24);
            assert!(clock.minutes() < 60);
            assert!(clock.seconds() < 60);
            assert!(clock.subseconds() >= 0 && clock.subseconds() < TICK_HZ);
        }
    }

    #[test]
    fn minute_rollover_carries_into_hours_and_wraps_the_day() {
        let mut clock = WallClock::new();
        // Edit to 23:59, then let it run.
        for _ in 0..11 {
            clock.increment_hours();
        }
        for _ in 0..59 {
            clock.increment_minutes();
        }
        assert_eq!((clock.hours(), clock.minutes()), (23, 59));
        assert!(clock.time_valid());

        tick_seconds(&mut clock, 58, 0);
        assert_eq!(
            (clock.hours(), clock.minutes(), clock.seconds()),
            (23, 59, 58)
        );

        tick_seconds(&mut clock, 2, 0);
        assert_eq!(
            (clock.hours(), clock.minutes(), clock.seconds()),
            (0, 0, 0)
        );
    }

    #[test]
    fn zero_calibration_leaves_the_accumulator_untouched() {
        let mut clock = WallClock::new();
        for second in 0..(CALIBRATION_WINDOW_SECONDS + 2) {
            for expected in 0..TICK_HZ {
                clock.tick(0);
                assert_eq!(
                    clock.subseconds(),
                    (expected + 1) % TICK_HZ,
                    "drifted in second {second}"
                );
            }
        }
    }

    #[test]
    fn calibration_nudges_once_per_window() {
        let mut clock = WallClock::new();
        tick_seconds(&mut clock, CALIBRATION_WINDOW_SECONDS - 1, 40);
        assert_eq!(clock.subseconds(), 0);
        // The window closes during this second; the nudge lands right after
        // the rollover.
        tick_seconds(&mut clock, 1, 40);
        assert_eq!(clock.subseconds(), 40);
    }

    #[test]
    fn an_extreme_correction_cascades_without_losing_seconds() {
        let mut clock = WallClock::new();
        // Walk up to one tick before the window closes.
        tick_seconds(&mut clock, CALIBRATION_WINDOW_SECONDS - 1, 0);
        for _ in 0..(TICK_HZ - 1) {
            clock.tick(0);
        }
        // The closing tick applies a correction worth three extra seconds.
        let outcome = clock.tick(3 * TICK_HZ as i16 + 5);
        assert_eq!(outcome.seconds_elapsed, 4);
        assert_eq!(clock.subseconds(), 5);
        let elapsed = CALIBRATION_WINDOW_SECONDS - 1 + 4;
        assert_eq!(u32::from(clock.seconds()), elapsed % 60);
    }

    #[test]
    fn negative_calibration_delays_the_next_second() {
        let mut clock = WallClock::new();
        tick_seconds(&mut clock, CALIBRATION_WINDOW_SECONDS, -100);
        assert_eq!(clock.subseconds(), -100);
        let before = clock.seconds();
        // The next second now needs TICK_HZ + 100 ticks.
        for _ in 0..(TICK_HZ + 99) {
            clock.tick(-100);
        }
        assert_eq!(clock.seconds(), before);
        clock.tick(-100);
        assert_eq!(clock.seconds(), (before + 1) % 60);
    }

    #[test]
    fn edits_zero_seconds_and_mark_time_valid() {
        let mut clock = WallClock::new();
        tick_seconds(&mut clock, 42, 0);
        assert_eq!(clock.seconds(), 42);
        clock.increment_minutes();
        assert_eq!((clock.minutes(), clock.seconds()), (1, 0));
        assert!(clock.time_valid());

        tick_seconds(&mut clock, 9, 0);
        clock.increment_hours();
        assert_eq!((clock.hours(), clock.seconds()), (13, 0));
    }
}
