//! Liveness backstop fed from the tick handler.

/// The hardware watchdog collaborator. The tick handler feeds it on every
/// invocation; a handler that hangs stops the feeding and the hardware
/// restarts the device. There is no software fatal-error path.
pub trait Watchdog {
    fn feed(&mut self);
}

#[cfg(feature = "pico1")]
impl Watchdog for embassy_rp::watchdog::Watchdog {
    fn feed(&mut self) {
        embassy_rp::watchdog::Watchdog::feed(self);
    }
}
