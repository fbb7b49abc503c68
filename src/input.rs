//! Discrete input for the tic-tac-toe board.
//!
//! The tilt sampler runs in its own task and is the only producer on the
//! move channel; the board task is the only consumer. Presses come from a
//! debounced button.

use core::future::Future;

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::Sender,
};
use embassy_time::{
    Duration,
    Ticker,
};

use crate::{
    config::TILT_THRESHOLD_G,
    grid::Move,
    sensor::{
        Accel,
        MotionSensor,
    },
};

/// A source of button presses.
pub trait PressSource {
    /// Resolve as soon as the next press lands, without waiting for the
    /// release. The future may be dropped before it resolves (the board
    /// races it against cursor moves), and a press it already reported must
    /// never be reported again.
    fn wait_for_press(&mut self) -> impl Future<Output = ()>;
}

/// Turns a stream of accelerometer samples into cursor moves.
///
/// A tilt past the threshold yields one move; the sampler then stays quiet
/// until the board returns to rest on every axis. X tilt is up/down, Y tilt
/// is left/right, matching the paddle axis of the Pong layout.
#[derive(Debug, Clone)]
pub struct TiltSampler {
    threshold: f32,
    armed: bool,
}

impl TiltSampler {
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            armed: true,
        }
    }

    pub fn sample(&mut self, accel: Accel) -> Option<Move> {
        let direction = self.classify(accel);
        match direction {
            None => {
                self.armed = true;
                None
            }
            Some(_) if self.armed => {
                self.armed = false;
                direction
            }
            Some(_) => None,
        }
    }

    fn classify(&self, accel: Accel) -> Option<Move> {
        let t = self.threshold;
        let x_tilted = accel.x > t || accel.x < -t;
        let y_tilted = accel.y > t || accel.y < -t;

        // The steeper axis wins when both are tilted.
        let prefer_x = x_tilted && (!y_tilted || magnitude(accel.x) >= magnitude(accel.y));
        if prefer_x {
            Some(if accel.x > t { Move::Down } else { Move::Up })
        } else if y_tilted {
            Some(if accel.y > t { Move::Right } else { Move::Left })
        } else {
            None
        }
    }
}

impl Default for TiltSampler {
    fn default() -> Self {
        Self::new(TILT_THRESHOLD_G)
    }
}

fn magnitude(value: f32) -> f32 {
    if value < 0.0 { -value } else { value }
}

/// Sample `sensor` every `period` and push each move into `moves`.
///
/// Moves are dropped when the queue is full rather than stalling the
/// sampler.
pub async fn sample_tilt<S, M, const N: usize>(
    sensor: &mut S,
    moves: Sender<'_, M, Move, N>,
    period: Duration,
) -> !
where
    S: MotionSensor,
    M: RawMutex,
{
    let mut sampler = TiltSampler::default();
    let mut ticker = Ticker::every(period);
    loop {
        match sensor.read_accel() {
            Ok(accel) => {
                if let Some(direction) = sampler.sample(accel)
                    && moves.try_send(direction).is_err()
                {
                    debug!("move queue full, dropping {}", direction);
                }
            }
            Err(_) => warn!("tilt sample failed"),
        }
        ticker.next().await;
    }
}
