//! Shared game state.
//!
//! One [`GameState`] exists for the life of the program. Every Pong task gets
//! it by `&mut` from the controller, which runs tasks one at a time, so each
//! field has exactly one writer at any instant.
//!
//! ## Axis convention
//!
//! The panel is mounted rotated. Game coordinates are:
//!
//! ```text
//!   game Y (paddle axis)  = panel X, bounded by the panel *width*  (breadth)
//!   game X (ball travel)  = panel Y, bounded by the panel *height* (length)
//! ```
//!
//! The user paddle sits at game X = 0, the AI paddle at the far end.

use embedded_graphics::geometry::Size;

use crate::config::{
    BALL_SIZE,
    PADDLE_HEIGHT,
};

/// Direction of travel on one axis. Speed is fixed, so this is all a
/// velocity component can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Heading {
    Negative,
    Positive,
}

impl Heading {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Negative => Self::Positive,
            Self::Positive => Self::Negative,
        }
    }

    pub fn flip(&mut self) {
        *self = self.flipped();
    }

    /// Signed unit value, `-1` or `+1`.
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Negative => -1,
            Self::Positive => 1,
        }
    }
}

/// Which end of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    User,
    Ai,
}

/// Screen extent in game coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Playfield {
    /// Extent of the paddle axis (panel width).
    pub breadth: u16,
    /// Extent of the ball travel axis (panel height).
    pub length: u16,
}

impl Playfield {
    #[must_use]
    pub const fn new(breadth: u16, length: u16) -> Self {
        Self { breadth, length }
    }

    /// Playfield for a panel of the given size (width × height, as reported
    /// by the display driver).
    #[must_use]
    pub fn from_panel(size: Size) -> Self {
        Self {
            breadth: u16::try_from(size.width).unwrap_or(u16::MAX),
            length: u16::try_from(size.height).unwrap_or(u16::MAX),
        }
    }

    /// Largest paddle top coordinate that keeps the paddle on screen.
    #[must_use]
    pub const fn max_paddle_y(&self) -> u16 {
        self.breadth.saturating_sub(PADDLE_HEIGHT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameState {
    pub user_paddle_y: u16,
    pub ai_paddle_y: u16,

    pub ball_x: u16,
    pub ball_y: u16,
    /// Position before the last advance, kept so the old sprite can be erased.
    pub prev_ball_x: u16,
    pub prev_ball_y: u16,
    pub ball_vel_x: Heading,
    pub ball_vel_y: Heading,

    pub user_paddle_dirty: bool,
    pub ai_paddle_dirty: bool,

    /// Set on a missed ball. Once set it is never cleared; only a device
    /// restart gets rid of it.
    pub reset_requested: bool,
}

impl GameState {
    /// Power-on state: ball mid-table heading towards the AI, both paddles
    /// waiting for their first paint.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            user_paddle_y: 0,
            ai_paddle_y: 35,
            ball_x: 80,
            ball_y: 35,
            prev_ball_x: 80,
            prev_ball_y: 35,
            ball_vel_x: Heading::Positive,
            ball_vel_y: Heading::Positive,
            user_paddle_dirty: true,
            ai_paddle_dirty: true,
            reset_requested: false,
        }
    }

    #[must_use]
    pub const fn paddle_y(&self, side: Side) -> u16 {
        match side {
            Side::User => self.user_paddle_y,
            Side::Ai => self.ai_paddle_y,
        }
    }

    /// True when the paddle on `side` spans the ball's full extent on the
    /// paddle axis.
    #[must_use]
    pub const fn paddle_covers_ball(&self, side: Side) -> bool {
        let top = self.paddle_y(side);
        self.ball_y >= top
            && self.ball_y.saturating_add(BALL_SIZE) <= top.saturating_add(PADDLE_HEIGHT)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
