//! The single owned device-state aggregate and its handler entry points.
//!
//! One core, no scheduler: the wall-clock tick and the two display timer
//! events are the only things that run, they never overlap, and they all
//! funnel through the handlers here. That total exclusion is what lets the
//! state live in one plain struct with no per-field locking; the device
//! layer wraps the whole aggregate in a critical-section mutex and nothing
//! else ever touches it.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::config::{BlinkPhase, ClockConfig};
use crate::constants::{BUTTON_COUNT, DIGIT_COUNT};
use crate::crossfade::{DigitDrive, FadePanel};
use crate::debounce::{ButtonEvent, ButtonState, Debouncer};
use crate::glyphs::Glyph;
use crate::mode::{Mode, ModeMachine};
use crate::params::{ParamStore, Params};
use crate::wall_clock::WallClock;
use crate::watchdog::Watchdog;

/// The whole appliance state, mutated only through the handler entry
/// points below.
pub struct LedClock {
    config: ClockConfig,
    clock: WallClock,
    buttons: [Debouncer; BUTTON_COUNT],
    mode: ModeMachine,
    panel: FadePanel,
    params: Params,
    /// Separator (colon) indicator, toggled at 1 Hz.
    separator: bool,
}

/// `LedClock` behind the critical-section mutex the device tasks share.
pub type SharedLedClock = Mutex<CriticalSectionRawMutex, RefCell<LedClock>>;

impl LedClock {
    #[must_use]
    pub fn new(config: ClockConfig, params: Params) -> Self {
        let params = params.clamped(&config);
        let mut panel = FadePanel::new();
        panel.set_brightness(params.brightness);
        let mut this = Self {
            config,
            clock: WallClock::new(),
            buttons: [Debouncer::new(), Debouncer::new()],
            mode: ModeMachine::new(),
            panel,
            params,
            separator: false,
        };
        // Show the boot time immediately instead of fading in from blank
        // at some later refresh.
        this.refresh();
        this
    }

    /// Wall-clock tick handler.
    ///
    /// Feeds the watchdog, advances time (with calibration), samples both
    /// buttons, detects the mode-change combo, routes edit events for the
    /// active mode, and expires idle setting modes. Any persist triggered
    /// here completes before the handler returns.
    pub fn on_tick(
        &mut self,
        raw_pressed: [bool; BUTTON_COUNT],
        store: &mut impl ParamStore,
        watchdog: &mut impl Watchdog,
    ) {
        watchdog.feed();

        let outcome = self.clock.tick(self.params.calibration);
        let mut refresh = outcome.minute_rolled;

        // Keep the not-yet-set blink animating.
        if !self.clock.time_valid() {
            refresh = true;
        }

        self.separator = self.clock.seconds() % 2 == 1;

        for _ in 0..outcome.seconds_elapsed {
            if self.mode.on_second() {
                store.save(&self.params);
                refresh = true;
            }
        }

        let subseconds = self.clock.subseconds();
        let events = [
            self.buttons[0].sample(raw_pressed[0], subseconds),
            self.buttons[1].sample(raw_pressed[1], subseconds),
        ];

        if self
            .buttons
            .iter()
            .all(|button| button.state() == ButtonState::LongPress)
        {
            // Mode-change combo. Locking both buttons swallows the rest of
            // the hold, so the combo cannot re-trigger and no stray edits
            // land in the new mode.
            self.mode.advance();
            for button in &mut self.buttons {
                button.lock();
            }
            if self.config.persist_on_mode_advance {
                store.save(&self.params);
            }
            refresh = true;
        } else if let Some(index) = dispatch_index(&events) {
            self.apply_edit(index);
            refresh = true;
        }

        if refresh {
            self.refresh();
        }
    }

    /// Digit-select handler (highest rate): what to drive for the current
    /// position.
    pub fn on_digit_select(&mut self) -> DigitDrive {
        self.panel.select()
    }

    /// Ramp-cutoff handler (mid-window): the crossover rewrite, or `None`
    /// once the fade has completed.
    pub fn on_ramp_cutoff(&mut self) -> Option<DigitDrive> {
        self.panel.cutoff()
    }

    /// Cycle-end handler (per digit window): the caller blanks the panel
    /// for the brightness gate; the shared ramp steps on wrap.
    pub fn on_cycle_end(&mut self) {
        self.panel.cycle_end();
    }

    /// Separator indicator state, lit on odd seconds.
    #[must_use]
    pub const fn separator(&self) -> bool {
        self.separator
    }

    /// Shared ramp threshold (x/256), for scheduling the cutoff point.
    #[must_use]
    pub const fn ramp(&self) -> u8 {
        self.panel.ramp()
    }

    /// Panel duty (x/256), for scheduling the brightness gate.
    #[must_use]
    pub const fn duty(&self) -> u8 {
        self.panel.duty()
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode.mode()
    }

    #[must_use]
    pub const fn params(&self) -> Params {
        self.params
    }

    #[must_use]
    pub const fn time_valid(&self) -> bool {
        self.clock.time_valid()
    }

    fn apply_edit(&mut self, button_index: usize) {
        self.mode.note_edit();
        match self.mode.mode() {
            Mode::Normal => {
                if button_index == 0 {
                    self.clock.increment_minutes();
                } else {
                    self.clock.increment_hours();
                }
            }
            Mode::Calibration => {
                let delta = if button_index == 0 { 1 } else { -1 };
                self.params.adjust_calibration(delta, &self.config);
            }
            Mode::Brightness => {
                let delta = if button_index == 0 { 1 } else { -1 };
                self.params.adjust_brightness(delta, &self.config);
                self.panel.set_brightness(self.params.brightness);
            }
        }
    }

    /// Recompute every digit's target from the current mode and state and
    /// hand the set to the crossfade panel.
    fn refresh(&mut self) {
        let glyphs = match self.mode.mode() {
            Mode::Normal => self.render_time(),
            Mode::Calibration => self.render_calibration(),
            Mode::Brightness => [
                Glyph::LetterB,
                Glyph::Blank,
                Glyph::Blank,
                Glyph::Digit(self.params.brightness),
            ],
        };
        self.panel.retarget(glyphs.map(Glyph::segments));
    }

    #[expect(
        clippy::integer_division_remainder_used,
        reason = "digit extraction"
    )]
    fn render_time(&self) -> [Glyph; DIGIT_COUNT] {
        if !self.clock.time_valid() && self.blank_phase() {
            return [Glyph::Blank; DIGIT_COUNT];
        }
        [
            Glyph::Digit(self.clock.hours() / 10),
            Glyph::Digit(self.clock.hours() % 10),
            Glyph::Digit(self.clock.minutes() / 10),
            Glyph::Digit(self.clock.minutes() % 10),
        ]
    }

    #[expect(
        clippy::integer_division_remainder_used,
        clippy::cast_possible_truncation,
        reason = "the magnitude is at most 999 after saturation"
    )]
    fn render_calibration(&self) -> [Glyph; DIGIT_COUNT] {
        let offset = self.params.calibration;
        let sign = if offset < 0 { Glyph::Minus } else { Glyph::Blank };
        // The magnitude field is three digits; the ±1000 variant shows its
        // extreme as 999.
        let magnitude = offset.unsigned_abs().min(999);
        [
            sign,
            Glyph::Digit((magnitude / 100) as u8),
            Glyph::Digit((magnitude / 10 % 10) as u8),
            Glyph::Digit((magnitude % 10) as u8),
        ]
    }

    #[expect(
        clippy::integer_division_remainder_used,
        reason = "second parity"
    )]
    fn blank_phase(&self) -> bool {
        let odd = self.clock.seconds() % 2 == 1;
        match self.config.blink_phase {
            BlinkPhase::OddSeconds => odd,
            BlinkPhase::EvenSeconds => !odd,
        }
    }
}

/// Pick at most one event per tick: fresh presses beat autorepeat, button
/// 0 beats button 1.
fn dispatch_index(events: &[Option<ButtonEvent>; BUTTON_COUNT]) -> Option<usize> {
    events
        .iter()
        .position(|event| *event == Some(ButtonEvent::Press))
        .or_else(|| events.iter().position(Option::is_some))
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::{LedClock, Mode};
    use crate::config::ClockConfig;
    use crate::constants::{
        BUTTON_COOLDOWN_TICKS, BUTTON_LONG_PRESS_TICKS, DIGIT_COUNT, TICK_HZ,
    };
    use crate::glyphs::Glyph;
    use crate::params::{ParamStore, Params};
    use crate::watchdog::Watchdog;

    struct RecordingStore {
        saves: u32,
        last: Option<Params>,
    }

    impl RecordingStore {
        const fn new() -> Self {
            Self {
                saves: 0,
                last: None,
            }
        }
    }

    impl ParamStore for RecordingStore {
        fn load(&mut self) -> Params {
            self.last.unwrap_or_else(Params::defaults)
        }

        fn save(&mut self, params: &Params) {
            self.saves += 1;
            self.last = Some(*params);
        }
    }

    struct CountingWatchdog {
        feeds: u64,
    }

    impl Watchdog for CountingWatchdog {
        fn feed(&mut self) {
            self.feeds += 1;
        }
    }

    struct Bench {
        engine: LedClock,
        store: RecordingStore,
        dog: CountingWatchdog,
    }

    impl Bench {
        fn new() -> Self {
            Self::with_params(Params::defaults())
        }

        fn with_params(params: Params) -> Self {
            Self {
                engine: LedClock::new(ClockConfig::DEFAULT, params),
                store: RecordingStore::new(),
                dog: CountingWatchdog { feeds: 0 },
            }
        }

        fn tick(&mut self, raw: [bool; 2]) {
            self.engine.on_tick(raw, &mut self.store, &mut self.dog);
        }

        fn tick_n(&mut self, count: u32, raw: [bool; 2]) {
            for _ in 0..count {
                self.tick(raw);
            }
        }

        /// Hold until one press event lands, then release.
        fn press(&mut self, button: usize) {
            let mut raw = [false; 2];
            raw[button] = true;
            self.tick_n(u32::from(BUTTON_COOLDOWN_TICKS), raw);
            self.tick([false; 2]);
        }

        /// Hold both buttons long enough to trigger the mode combo.
        fn combo(&mut self) {
            self.tick_n(u32::from(BUTTON_LONG_PRESS_TICKS) + 2, [true; 2]);
        }

        fn shown(&mut self) -> [u8; DIGIT_COUNT] {
            core::array::from_fn(|index| self.engine.panel.slot(index).lit_mask())
        }
    }

    #[test]
    fn watchdog_is_fed_every_tick() {
        let mut bench = Bench::new();
        bench.tick_n(1000, [false; 2]);
        assert_eq!(bench.dog.feeds, 1000);
    }

    #[test]
    fn minute_edit_shows_up_and_validates_time() {
        let mut bench = Bench::new();
        assert!(!bench.engine.time_valid());
        bench.press(0);
        assert!(bench.engine.time_valid());
        let digits = bench.shown();
        assert_eq!(
            digits,
            [
                Glyph::Digit(1).segments(),
                Glyph::Digit(2).segments(),
                Glyph::Digit(0).segments(),
                Glyph::Digit(1).segments(),
            ]
        );
        bench.press(1);
        assert_eq!(bench.shown()[1], Glyph::Digit(3).segments());
    }

    #[test]
    fn invalid_time_blinks_at_one_hertz() {
        let mut bench = Bench::new();
        // Second 0 (even): shown.
        assert_ne!(bench.shown(), [0; DIGIT_COUNT]);
        bench.tick_n(TICK_HZ as u32, [false; 2]);
        // Second 1 (odd): blanked.
        assert_eq!(bench.shown(), [0; DIGIT_COUNT]);
        assert!(bench.engine.separator());
        bench.tick_n(TICK_HZ as u32, [false; 2]);
        assert_ne!(bench.shown(), [0; DIGIT_COUNT]);
        assert!(!bench.engine.separator());
    }

    #[test]
    fn valid_time_does_not_blink() {
        let mut bench = Bench::new();
        bench.press(0);
        let shown = bench.shown();
        bench.tick_n(TICK_HZ as u32, [false; 2]);
        assert_eq!(bench.shown(), shown);
    }

    #[test]
    fn combo_advances_mode_once_and_locks_both_buttons() {
        let mut bench = Bench::new();
        bench.combo();
        assert_eq!(bench.engine.mode(), Mode::Calibration);
        // Still holding: no re-trigger, no edits.
        let params = bench.engine.params();
        bench.tick_n(TICK_HZ as u32, [true; 2]);
        assert_eq!(bench.engine.mode(), Mode::Calibration);
        assert_eq!(bench.engine.params(), params);
        // Release, combo again: next mode.
        bench.tick([false; 2]);
        bench.combo();
        assert_eq!(bench.engine.mode(), Mode::Brightness);
        bench.tick([false; 2]);
        bench.combo();
        assert_eq!(bench.engine.mode(), Mode::Normal);
    }

    #[test]
    fn calibration_mode_edits_and_display() {
        let mut bench = Bench::new();
        bench.combo();
        bench.tick([false; 2]);
        bench.press(0);
        bench.press(0);
        bench.press(1);
        assert_eq!(bench.engine.params().calibration, 1);
        assert_eq!(
            bench.shown(),
            [
                Glyph::Blank.segments(),
                Glyph::Digit(0).segments(),
                Glyph::Digit(0).segments(),
                Glyph::Digit(1).segments(),
            ]
        );
        bench.press(1);
        bench.press(1);
        assert_eq!(bench.engine.params().calibration, -1);
        assert_eq!(bench.shown()[0], Glyph::Minus.segments());
    }

    #[test]
    fn calibration_saturates_at_the_limit() {
        let config = ClockConfig::DEFAULT;
        let mut bench = Bench::with_params(Params {
            calibration: config.calibration_limit,
            brightness: 7,
        });
        bench.combo();
        bench.tick([false; 2]);
        bench.press(0);
        assert_eq!(bench.engine.params().calibration, config.calibration_limit);
    }

    #[test]
    fn brightness_mode_shows_label_and_level() {
        let mut bench = Bench::new();
        bench.combo();
        bench.tick([false; 2]);
        bench.combo();
        bench.tick([false; 2]);
        assert_eq!(bench.engine.mode(), Mode::Brightness);
        assert_eq!(
            bench.shown(),
            [
                Glyph::LetterB.segments(),
                Glyph::Blank.segments(),
                Glyph::Blank.segments(),
                Glyph::Digit(7).segments(),
            ]
        );
        bench.press(1);
        assert_eq!(bench.engine.params().brightness, 6);
        assert_eq!(bench.shown()[3], Glyph::Digit(6).segments());
    }

    #[test]
    fn idle_setting_mode_times_out_and_persists_once() {
        let mut bench = Bench::new();
        bench.combo();
        bench.tick([false; 2]);
        assert_eq!(bench.engine.mode(), Mode::Calibration);
        assert_eq!(bench.store.saves, 0);

        bench.tick_n(6 * TICK_HZ as u32, [false; 2]);
        assert_eq!(bench.engine.mode(), Mode::Normal);
        assert_eq!(bench.store.saves, 1);

        // Long after, still exactly one persist.
        bench.tick_n(10 * TICK_HZ as u32, [false; 2]);
        assert_eq!(bench.store.saves, 1);
    }

    #[test]
    fn edits_reset_the_idle_timeout() {
        let mut bench = Bench::new();
        bench.combo();
        bench.tick([false; 2]);
        for _ in 0..4 {
            bench.tick_n(3 * TICK_HZ as u32, [false; 2]);
            bench.press(0);
        }
        assert_eq!(bench.engine.mode(), Mode::Calibration);
        assert_eq!(bench.store.saves, 0);
    }

    #[test]
    fn autorepeat_edits_while_held() {
        let mut bench = Bench::new();
        bench.combo();
        bench.tick([false; 2]);
        // Hold the increase button for two seconds past the long-press
        // threshold: one press plus 4 Hz autorepeat.
        let raw = [true, false];
        bench.tick_n(u32::from(BUTTON_LONG_PRESS_TICKS) + 2 * TICK_HZ as u32, raw);
        let calibration = bench.engine.params().calibration;
        assert!(
            (8..=10).contains(&calibration),
            "expected about 9 edits, got {calibration}"
        );
    }

    #[test]
    fn normal_mode_brightness_untouched_by_buttons() {
        let mut bench = Bench::new();
        bench.press(0);
        bench.press(1);
        assert_eq!(bench.engine.params(), Params::defaults());
    }
}
