//! Fixed game rules and task timing.
//!
//! Nothing here is configurable at runtime. The sizes are part of the
//! external contract with the display layout, the periods with the watchdog.

use embassy_time::Duration;

/// Paddle thickness along the ball's travel axis.
pub const PADDLE_WIDTH: u16 = 10;
/// Paddle length along the paddle axis.
pub const PADDLE_HEIGHT: u16 = 30;
/// Edge length of the square ball sprite.
pub const BALL_SIZE: u16 = 5;

/// Pixels a paddle moves per accepted step.
pub const PADDLE_STEP: u16 = 2;
/// Pixels the ball moves per tick on each axis.
pub const BALL_STEP: u16 = 1;

/// Tilt (in g) that has to be exceeded before the user paddle moves.
pub const TILT_THRESHOLD_G: f32 = 0.3;

/// Base scheduler tick.
pub const TICK_MS: u64 = 16;
/// The AI paddle runs every this many ticks.
pub const AI_PERIOD_TICKS: u64 = 3;
/// Hardware watchdog deadline.
pub const WATCHDOG_TIMEOUT_MS: u64 = 100;
/// Liveness task period, comfortably inside the deadline.
pub const WATCHDOG_KICK_MS: u64 = WATCHDOG_TIMEOUT_MS - 10;

/// Tic-tac-toe board edge.
pub const GRID_SIZE: usize = 3;
/// Cells on the board.
pub const POSITIONS: usize = GRID_SIZE * GRID_SIZE;
/// Highest cell index.
pub const LAST_POSITION: usize = POSITIONS - 1;

/// Directional events buffered between the tilt sampler and the board.
pub const INPUT_QUEUE_DEPTH: usize = 4;
/// How often the tilt sampler reads the accelerometer.
pub const TILT_SAMPLE_MS: u64 = 50;

/// Periods of the Pong tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    pub tick: Duration,
    pub ai_paddle: Duration,
    pub watchdog_kick: Duration,
    pub watchdog_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(TICK_MS),
            ai_paddle: Duration::from_millis(TICK_MS * AI_PERIOD_TICKS),
            watchdog_kick: Duration::from_millis(WATCHDOG_KICK_MS),
            watchdog_timeout: Duration::from_millis(WATCHDOG_TIMEOUT_MS),
        }
    }
}
