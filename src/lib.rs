//! Control core for a two-button, 4-digit 7-segment LED clock appliance.
//!
//! The pure state machines (timekeeping, debounce, mode cycle, crossfade)
//! live in target-independent modules and test on the host; the `pico1`
//! feature adds the embassy-rp hardware layer that drives them from the
//! real tick interrupt and display timers.
#![no_std]

mod config;
mod constants;
mod crossfade;
mod debounce;
mod engine;
mod error;
mod glyphs;
mod mode;
mod params;
mod wall_clock;
mod watchdog;

#[cfg(feature = "pico1")]
mod device;
#[cfg(feature = "pico1")]
mod hardware;
#[cfg(feature = "pico1")]
mod output_array;
#[cfg(feature = "pico1")]
mod param_flash;

// Re-export commonly used items
pub use config::{BlinkPhase, ClockConfig};
pub use constants::*;
pub use crossfade::{DigitDrive, DigitSlot, FadePanel, duty_for_level};
pub use debounce::{ButtonEvent, ButtonState, Debouncer};
pub use engine::{LedClock, SharedLedClock};
pub use error::{Error, Result};
pub use glyphs::Glyph;
pub use mode::{Mode, ModeMachine};
pub use params::{ParamStore, Params, validate_loaded};
pub use wall_clock::{TickOutcome, WallClock};
pub use watchdog::Watchdog;

#[cfg(feature = "pico1")]
pub use device::LedClockDevice;
#[cfg(feature = "pico1")]
pub use hardware::Hardware;
#[cfg(feature = "pico1")]
pub use output_array::OutputArray;
#[cfg(feature = "pico1")]
pub use param_flash::{FlashParams, INTERNAL_FLASH_SIZE};
