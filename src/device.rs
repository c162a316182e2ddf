//! Embassy glue: the hardware-timing sources that drive the engine.
//!
//! Two tasks share the [`LedClock`] aggregate through a critical-section
//! mutex, which is the single-core port of "handlers never overlap": the
//! tick task stands in for the external RTC interrupt, the display task
//! for the multiplex timer's three sub-events. Locks are held only for
//! the handler body; all waiting happens outside them.

use core::cell::RefCell;

use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::gpio::{self, Level};
use embassy_time::{Duration, Ticker, Timer};
use static_cell::StaticCell;

use crate::config::ClockConfig;
use crate::constants::{
    BUTTON_COUNT, DIGIT_COUNT, DIGIT_PERIOD, SEGMENT_COUNT, TICK_HZ, WATCHDOG_TIMEOUT,
};
use crate::engine::{LedClock, SharedLedClock};
use crate::error::Result;
use crate::hardware::Hardware;
use crate::output_array::OutputArray;
use crate::param_flash::FlashParams;
use crate::params::ParamStore;

static ENGINE: StaticCell<SharedLedClock> = StaticCell::new();

/// The running appliance: parameters loaded, watchdog armed, tasks
/// spawned.
pub struct LedClockDevice {
    engine: &'static SharedLedClock,
}

impl LedClockDevice {
    /// Bring up the whole appliance.
    ///
    /// # Errors
    ///
    /// Returns an error if a task cannot be spawned.
    pub fn new(hardware: Hardware, config: ClockConfig, spawner: Spawner) -> Result<Self> {
        let Hardware {
            cells,
            segments,
            separator,
            buttons,
            flash,
            watchdog,
        } = hardware;

        let mut store = FlashParams::new(flash, config);
        let params = store.load();
        info!(
            "params loaded: calibration {} brightness {}",
            params.calibration, params.brightness
        );

        let mut dog = embassy_rp::watchdog::Watchdog::new(watchdog);
        dog.start(WATCHDOG_TIMEOUT);

        let engine: &'static SharedLedClock = ENGINE.init(SharedLedClock::new(RefCell::new(
            LedClock::new(config, params),
        )));

        spawner.spawn(tick_task(engine, buttons, separator, store, dog))?;
        spawner.spawn(display_task(engine, cells, segments))?;
        Ok(Self { engine })
    }

    /// Shared engine handle.
    #[must_use]
    pub const fn engine(&self) -> &'static SharedLedClock {
        self.engine
    }
}

/// Stands in for the external 1/`TICK_HZ`-second interrupt.
#[embassy_executor::task]
async fn tick_task(
    engine: &'static SharedLedClock,
    buttons: [gpio::Input<'static>; BUTTON_COUNT],
    mut separator: gpio::Output<'static>,
    mut store: FlashParams,
    mut dog: embassy_rp::watchdog::Watchdog,
) -> ! {
    // The embassy timebase cannot hit 1/1024 s exactly; the residual is a
    // few hundred ppm, inside the calibration range.
    let mut ticker = Ticker::every(Duration::from_hz(TICK_HZ as u64));
    loop {
        ticker.next().await;
        // Buttons are active low.
        let raw = [buttons[0].is_low(), buttons[1].is_low()];
        let lit = engine.lock(|cell| {
            let mut clock = cell.borrow_mut();
            clock.on_tick(raw, &mut store, &mut dog);
            clock.separator()
        });
        separator.set_level(if lit { Level::High } else { Level::Low });
    }
}

/// Stands in for the multiplex timer: per digit window, the select event,
/// the ramp-cutoff event at the crossfade threshold, and the cycle-end
/// event that opens the brightness gate.
#[embassy_executor::task]
async fn display_task(
    engine: &'static SharedLedClock,
    mut cells: OutputArray<'static, DIGIT_COUNT>,
    mut segments: OutputArray<'static, SEGMENT_COUNT>,
) -> ! {
    loop {
        let (drive, ramp, duty) = engine.lock(|cell| {
            let mut clock = cell.borrow_mut();
            (clock.on_digit_select(), clock.ramp(), clock.duty())
        });
        #[cfg(feature = "display-trace")]
        info!("digit {} segments {=u8:b}", drive.cell, drive.segments);
        let _ = segments.set_from_bits(drive.segments);
        cells.set_level_at(drive.cell as usize, Level::Low);

        Timer::after(window_fraction(u16::from(ramp))).await;

        if let Some(cutover) = engine.lock(|cell| cell.borrow_mut().on_ramp_cutoff()) {
            let _ = segments.set_from_bits(cutover.segments);
        }

        Timer::after(window_fraction(u16::from(duty.saturating_sub(ramp)))).await;

        engine.lock(|cell| cell.borrow_mut().on_cycle_end());
        cells.set_level_at(drive.cell as usize, Level::High);
        let _ = segments.set_from_bits(0);

        Timer::after(window_fraction(256 - u16::from(duty))).await;
    }
}

/// `numerator`/256 of one digit window.
fn window_fraction(numerator: u16) -> Duration {
    Duration::from_ticks(DIGIT_PERIOD.as_ticks() * u64::from(numerator) / 256)
}
