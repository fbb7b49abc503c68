//! Liveness guard.
//!
//! The game never repairs itself after a miss. Instead the guard stops
//! feeding the hardware watchdog and lets it restart the device from
//! power-on.

use embassy_time::Duration;

use crate::{
    scheduler::TaskControl,
    state::GameState,
};

/// A hardware watchdog that restarts the device unless kicked in time.
pub trait Watchdog {
    /// Arm the watchdog.
    fn enable(&mut self, timeout: Duration);

    /// Reset the countdown.
    fn kick(&mut self);

    /// Called once when the guard gives up on the device. The watchdog is no
    /// longer being kicked, so doing nothing here still ends in a reset;
    /// implementations may restart sooner.
    fn request_fatal_reset(&mut self) {}
}

/// One guard tick. Kicks the watchdog unless a reset has been requested, in
/// which case it requests the fatal reset and stops itself.
pub fn guard<W: Watchdog>(state: &GameState, watchdog: &mut W) -> TaskControl {
    if state.reset_requested {
        error!("reset requested, starving watchdog");
        watchdog.request_fatal_reset();
        return TaskControl::Stop;
    }

    watchdog.kick();
    TaskControl::Continue
}
