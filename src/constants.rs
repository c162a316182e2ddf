//! Build-time rates, thresholds, and display duty constants.

use embassy_time::Duration;

/// Rate of the external wall-clock tick interrupt, in Hz.
///
/// Calibration units, button thresholds, and the autorepeat phase gate are
/// all defined relative to this rate.
pub const TICK_HZ: i32 = 1024;

/// Continuous assertion required before a press registers, in ticks.
pub const BUTTON_COOLDOWN_TICKS: u16 = 200;

/// Continuous assertion after which a press becomes a long press, in ticks.
pub const BUTTON_LONG_PRESS_TICKS: u16 = 2000;

/// Synthetic press rate while a button is held in long press, in Hz.
pub const AUTOREPEAT_HZ: i32 = 4;

/// Tick period of the autorepeat phase gate.
pub const AUTOREPEAT_PERIOD_TICKS: i32 = TICK_HZ / AUTOREPEAT_HZ;

/// Elapsed seconds between calibration applications.
///
/// One window of `TICK_HZ` seconds makes each offset unit worth roughly one
/// ppm: one accumulator tick per `TICK_HZ * TICK_HZ` ticks of real time.
pub const CALIBRATION_WINDOW_SECONDS: u32 = TICK_HZ as u32;

/// Accumulator ticks added per calibration offset unit, per window.
pub const CALIBRATION_STEP_TICKS: i32 = 1;

/// Seconds of inactivity before a setting mode falls back to Normal.
pub const MODE_TIMEOUT_SECONDS: u8 = 5;

/// Number of multiplexed digit positions.
pub const DIGIT_COUNT: usize = 4;

/// Width of the shared segment bus (7 segments plus the dot).
pub const SEGMENT_COUNT: usize = 8;

/// Number of physical buttons.
pub const BUTTON_COUNT: usize = 2;

/// Lowest crossfade duty threshold (x/256 of a digit window).
pub const RAMP_FLOOR: u8 = 16;

/// Ramp increase per full 4-digit sweep.
pub const RAMP_STEP: u8 = 4;

/// Panel duty (x/256) at brightness level 0.
pub const BRIGHTNESS_BASE_DUTY: u8 = 82;

/// Additional panel duty (x/256) per brightness level.
pub const BRIGHTNESS_STEP_DUTY: u8 = 24;

/// Time granted to each digit position, select to select (about 122 Hz for
/// a full 4-digit sweep).
pub const DIGIT_PERIOD: Duration = Duration::from_micros(2048);

/// Hardware watchdog timeout; the tick handler must feed faster than this.
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_millis(250);

// The autorepeat and blink cadences are integer divisions of the tick rate;
// a rate that does not divide evenly would skew them.
const _: () = assert!(TICK_HZ % AUTOREPEAT_HZ == 0);
const _: () = assert!(TICK_HZ % 2 == 0);
