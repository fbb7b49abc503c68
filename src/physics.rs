//! Ball and paddle motion.
//!
//! Each function is one task body: it reads and writes [`GameState`] and
//! returns. None of them touch the display.

use crate::{
    config::{
        BALL_SIZE,
        BALL_STEP,
        PADDLE_HEIGHT,
        PADDLE_STEP,
        PADDLE_WIDTH,
    },
    state::{
        GameState,
        Heading,
        Playfield,
        Side,
    },
};

/// Result of one ball tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BallOutcome {
    /// The ball moved, possibly after bouncing.
    Moved,
    /// The ball reached an end the paddle there did not cover.
    Missed(Side),
}

/// Advance the ball by one tick.
///
/// Order matters: bounce off the long edges, resolve the paddle ends,
/// remember the old position, then move. A miss sets
/// [`GameState::reset_requested`]; the ball is still reflected so its
/// coordinates stay on the table.
pub fn advance_ball(state: &mut GameState, field: &Playfield) -> BallOutcome {
    if state.ball_y.saturating_add(BALL_SIZE) >= field.breadth || state.ball_y == 0 {
        state.ball_vel_y.flip();
    }

    let on_user_end = state.ball_x <= PADDLE_WIDTH;
    let on_ai_end =
        state.ball_x.saturating_add(BALL_SIZE) >= field.length.saturating_sub(PADDLE_WIDTH);

    let mut outcome = BallOutcome::Moved;
    // Both ends can only be reached together on a table narrower than the
    // ball, but each is resolved on its own.
    for (reached, side) in [(on_user_end, Side::User), (on_ai_end, Side::Ai)] {
        if reached && !state.paddle_covers_ball(side) {
            state.reset_requested = true;
            outcome = BallOutcome::Missed(side);
        }
    }
    if on_user_end || on_ai_end {
        state.ball_vel_x.flip();
    }

    state.prev_ball_x = state.ball_x;
    state.prev_ball_y = state.ball_y;

    state.ball_x = step(state.ball_x, state.ball_vel_x, BALL_STEP);
    state.ball_y = step(state.ball_y, state.ball_vel_y, BALL_STEP);

    outcome
}

/// Move the user paddle from an accelerometer X reading (in g).
///
/// Positive tilt moves the paddle towards larger Y. Readings inside
/// `±threshold` leave position and dirty flag untouched. Returns whether the
/// paddle moved.
pub fn tilt_user_paddle(
    state: &mut GameState,
    field: &Playfield,
    accel_x: f32,
    threshold: f32,
) -> bool {
    let max_y = field.max_paddle_y();
    let at_top = state.user_paddle_y == 0;
    let at_bottom = state.user_paddle_y >= max_y;

    let next = if accel_x > threshold && !at_bottom {
        state.user_paddle_y.saturating_add(PADDLE_STEP).min(max_y)
    } else if accel_x < -threshold && !at_top {
        state.user_paddle_y.saturating_sub(PADDLE_STEP)
    } else {
        return false;
    };

    state.user_paddle_y = next;
    state.user_paddle_dirty = true;
    true
}

/// Steer the AI paddle's centre towards the ball's centre by one step.
///
/// A move is only taken when the whole step fits inside the field, so the
/// paddle may rest a pixel short of an edge. Returns whether it moved.
pub fn track_ball(state: &mut GameState, field: &Playfield) -> bool {
    let paddle_center = i32::from(state.ai_paddle_y) + i32::from(PADDLE_HEIGHT / 2);
    let ball_center = i32::from(state.ball_y) + i32::from(BALL_SIZE / 2);
    let delta = paddle_center - ball_center;

    if delta > 0 && state.ai_paddle_y >= PADDLE_STEP {
        state.ai_paddle_y -= PADDLE_STEP;
    } else if delta < 0
        && u32::from(state.ai_paddle_y) + u32::from(PADDLE_HEIGHT) + u32::from(PADDLE_STEP)
            <= u32::from(field.breadth)
    {
        state.ai_paddle_y += PADDLE_STEP;
    } else {
        return false;
    }

    state.ai_paddle_dirty = true;
    true
}

fn step(value: u16, heading: Heading, by: u16) -> u16 {
    match heading {
        Heading::Negative => value.saturating_sub(by),
        Heading::Positive => value.saturating_add(by),
    }
}
