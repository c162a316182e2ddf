//! Full clock appliance on a Raspberry Pi Pico.
//!
//! Wiring: digit-select lines on GP1-GP4, segment bus on GP5-GP12 (A
//! through G plus the dot), separator on GP16, buttons to ground on GP14
//! (minutes / increase) and GP15 (hours / decrease).

#![no_std]
#![no_main]

use defmt::unwrap;
use defmt_rtt as _;
use embassy_executor::Spawner;
use ledclock::{ClockConfig, Hardware, LedClockDevice};
use panic_probe as _;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let hardware = Hardware::default();
    let _device = unwrap!(LedClockDevice::new(
        hardware,
        ClockConfig::default(),
        spawner
    ));
    // The tick and display tasks run the appliance from here on.
}
