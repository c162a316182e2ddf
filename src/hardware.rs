//! Pin assignments for the clock appliance.

use embassy_rp::gpio::{self, Level, Pull};
use embassy_rp::peripherals::{FLASH, WATCHDOG};

use crate::constants::{BUTTON_COUNT, DIGIT_COUNT, SEGMENT_COUNT};
use crate::output_array::OutputArray;

/// Everything the appliance touches, bundled at init.
pub struct Hardware {
    /// Digit-select lines, one per display position (low = selected).
    pub cells: OutputArray<'static, DIGIT_COUNT>,
    /// Shared segment bus (high = segment lit).
    pub segments: OutputArray<'static, SEGMENT_COUNT>,
    /// Separator (colon) indicator.
    pub separator: gpio::Output<'static>,
    /// Active-low button inputs with pull-ups.
    pub buttons: [gpio::Input<'static>; BUTTON_COUNT],
    pub flash: FLASH,
    pub watchdog: WATCHDOG,
}

impl Default for Hardware {
    fn default() -> Self {
        let peripherals: embassy_rp::Peripherals =
            embassy_rp::init(embassy_rp::config::Config::default());

        let cells = OutputArray::new([
            gpio::Output::new(peripherals.PIN_1, Level::High),
            gpio::Output::new(peripherals.PIN_2, Level::High),
            gpio::Output::new(peripherals.PIN_3, Level::High),
            gpio::Output::new(peripherals.PIN_4, Level::High),
        ]);

        let segments = OutputArray::new([
            gpio::Output::new(peripherals.PIN_5, Level::Low),
            gpio::Output::new(peripherals.PIN_6, Level::Low),
            gpio::Output::new(peripherals.PIN_7, Level::Low),
            gpio::Output::new(peripherals.PIN_8, Level::Low),
            gpio::Output::new(peripherals.PIN_9, Level::Low),
            gpio::Output::new(peripherals.PIN_10, Level::Low),
            gpio::Output::new(peripherals.PIN_11, Level::Low),
            gpio::Output::new(peripherals.PIN_12, Level::Low),
        ]);

        let separator = gpio::Output::new(peripherals.PIN_16, Level::Low);

        let buttons = [
            gpio::Input::new(peripherals.PIN_14, Pull::Up),
            gpio::Input::new(peripherals.PIN_15, Pull::Up),
        ];

        Self {
            cells,
            segments,
            separator,
            buttons,
            flash: peripherals.FLASH,
            watchdog: peripherals.WATCHDOG,
        }
    }
}
