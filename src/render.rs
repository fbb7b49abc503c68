//! Pong repaint.
//!
//! Erase-and-redraw only: the screen is cleared once at start and once on
//! game over, never per frame. Every sprite is a filled rectangle, so erasing
//! is painting the background over the sprite's old rectangle.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        PrimitiveStyle,
        Rectangle,
    },
};

use crate::{
    config::{
        BALL_SIZE,
        PADDLE_HEIGHT,
        PADDLE_WIDTH,
    },
    state::{
        GameState,
        Playfield,
        Side,
    },
};

pub const BACKGROUND: Rgb565 = Rgb565::BLACK;
pub const PADDLE_COLOR: Rgb565 = Rgb565::YELLOW;
pub const BALL_COLOR: Rgb565 = Rgb565::GREEN;
pub const DIVIDER_COLOR: Rgb565 = Rgb565::WHITE;
pub const GAME_OVER_COLOR: Rgb565 = Rgb565::RED;

const ERASE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(BACKGROUND);

/// Which sprites a repaint pass touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Repainted {
    pub user_paddle: bool,
    pub ai_paddle: bool,
}

/// Panel rectangle of a sprite whose top-left is at game `(x, y)` and which
/// extends `along_x` on the travel axis and `along_y` on the paddle axis.
#[must_use]
pub fn sprite_rect(field: &Playfield, x: u16, y: u16, along_x: u16, along_y: u16) -> Rectangle {
    let panel_x = i32::from(field.breadth) - i32::from(along_y) - i32::from(y);
    Rectangle::new(
        Point::new(panel_x, i32::from(x)),
        Size::new(u32::from(along_y), u32::from(along_x)),
    )
}

#[must_use]
pub fn ball_rect(field: &Playfield, x: u16, y: u16) -> Rectangle {
    sprite_rect(field, x, y, BALL_SIZE, BALL_SIZE)
}

#[must_use]
pub fn paddle_rect(field: &Playfield, side: Side, paddle_y: u16) -> Rectangle {
    let x = match side {
        Side::User => 0,
        Side::Ai => field.length.saturating_sub(PADDLE_WIDTH),
    };
    sprite_rect(field, x, paddle_y, PADDLE_WIDTH, PADDLE_HEIGHT)
}

/// The centre line across the paddle axis.
#[must_use]
pub fn divider_rect(field: &Playfield) -> Rectangle {
    Rectangle::new(
        Point::new(0, i32::from(field.length / 2)),
        Size::new(u32::from(field.breadth), 1),
    )
}

/// Remembers what is on screen so paddles can be erased exactly.
#[derive(Debug, Clone, Default)]
pub struct Painter {
    user_paddle: Option<u16>,
    ai_paddle: Option<u16>,
}

impl Painter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            user_paddle: None,
            ai_paddle: None,
        }
    }

    /// Blank the screen and draw the divider.
    pub fn paint_initial<D>(&mut self, display: &mut D, field: &Playfield) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        display.clear(BACKGROUND)?;
        self.user_paddle = None;
        self.ai_paddle = None;
        paint_divider(display, field)
    }

    /// One repaint pass: dirty paddles, divider, then the ball.
    ///
    /// Clears each paddle's dirty flag as it is painted.
    pub fn repaint<D>(
        &mut self,
        display: &mut D,
        state: &mut GameState,
        field: &Playfield,
    ) -> Result<Repainted, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let mut painted = Repainted::default();

        if state.user_paddle_dirty {
            state.user_paddle_dirty = false;
            Self::paint_paddle(display, field, Side::User, &mut self.user_paddle, state.user_paddle_y)?;
            painted.user_paddle = true;
        }
        if state.ai_paddle_dirty {
            state.ai_paddle_dirty = false;
            Self::paint_paddle(display, field, Side::Ai, &mut self.ai_paddle, state.ai_paddle_y)?;
            painted.ai_paddle = true;
        }

        paint_divider(display, field)?;
        paint_ball(display, field, state)?;

        Ok(painted)
    }

    fn paint_paddle<D>(
        display: &mut D,
        field: &Playfield,
        side: Side,
        on_screen: &mut Option<u16>,
        paddle_y: u16,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if let Some(old) = on_screen.take() {
            paddle_rect(field, side, old)
                .into_styled(ERASE)
                .draw(display)?;
        }
        paddle_rect(field, side, paddle_y)
            .into_styled(PrimitiveStyle::with_fill(PADDLE_COLOR))
            .draw(display)?;
        *on_screen = Some(paddle_y);
        Ok(())
    }
}

fn paint_divider<D>(display: &mut D, field: &Playfield) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    divider_rect(field)
        .into_styled(PrimitiveStyle::with_fill(DIVIDER_COLOR))
        .draw(display)
}

fn paint_ball<D>(display: &mut D, field: &Playfield, state: &GameState) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    ball_rect(field, state.prev_ball_x, state.prev_ball_y)
        .into_styled(ERASE)
        .draw(display)?;
    ball_rect(field, state.ball_x, state.ball_y)
        .into_styled(PrimitiveStyle::with_fill(BALL_COLOR))
        .draw(display)
}

/// Flood the screen to signal a lost ball.
pub fn paint_game_over<D>(display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(GAME_OVER_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::RecordingDisplay;

    const FIELD: Playfield = Playfield::new(128, 160);

    fn fresh() -> (Painter, RecordingDisplay, GameState) {
        let mut display = RecordingDisplay::new(128, 160);
        let mut painter = Painter::new();
        painter.paint_initial(&mut display, &FIELD).unwrap();
        (painter, display, GameState::new())
    }

    #[test]
    fn sprites_follow_rotated_layout() {
        let ball = ball_rect(&FIELD, 80, 35);
        assert_eq!(ball.top_left, Point::new(128 - 5 - 35, 80));
        assert_eq!(ball.size, Size::new(5, 5));

        let user = paddle_rect(&FIELD, Side::User, 0);
        assert_eq!(user.top_left, Point::new(98, 0));
        assert_eq!(user.size, Size::new(30, 10));

        let ai = paddle_rect(&FIELD, Side::Ai, 35);
        assert_eq!(ai.top_left, Point::new(128 - 30 - 35, 150));
    }

    #[test]
    fn first_repaint_draws_everything() {
        let (mut painter, mut display, mut state) = fresh();

        let painted = painter.repaint(&mut display, &mut state, &FIELD).unwrap();
        assert_eq!(
            painted,
            Repainted {
                user_paddle: true,
                ai_paddle: true
            }
        );
        assert!(!state.user_paddle_dirty && !state.ai_paddle_dirty);

        assert_eq!(display.pixel(100, 5), Some(PADDLE_COLOR));
        assert_eq!(display.pixel(70, 155), Some(PADDLE_COLOR));
        assert_eq!(display.pixel(90, 82), Some(BALL_COLOR));
        assert_eq!(display.pixel(10, 80), Some(DIVIDER_COLOR));
    }

    #[test]
    fn repaint_without_changes_redraws_no_paddles() {
        let (mut painter, mut display, mut state) = fresh();
        painter.repaint(&mut display, &mut state, &FIELD).unwrap();

        let painted = painter.repaint(&mut display, &mut state, &FIELD).unwrap();
        assert_eq!(painted, Repainted::default());
    }

    #[test]
    fn moved_paddle_leaves_no_trail() {
        let (mut painter, mut display, mut state) = fresh();
        painter.repaint(&mut display, &mut state, &FIELD).unwrap();

        state.user_paddle_y = 40;
        state.user_paddle_dirty = true;
        painter.repaint(&mut display, &mut state, &FIELD).unwrap();

        // Old span was panel x 98..128, new one 58..88.
        assert_eq!(display.pixel(110, 5), Some(BACKGROUND));
        assert_eq!(display.pixel(60, 5), Some(PADDLE_COLOR));
    }

    #[test]
    fn ball_is_erased_at_previous_position() {
        let (mut painter, mut display, mut state) = fresh();
        painter.repaint(&mut display, &mut state, &FIELD).unwrap();

        state.prev_ball_x = state.ball_x;
        state.prev_ball_y = state.ball_y;
        state.ball_x += 10;
        painter.repaint(&mut display, &mut state, &FIELD).unwrap();

        assert_eq!(display.pixel(90, 82), Some(BACKGROUND));
        assert_eq!(display.pixel(90, 92), Some(BALL_COLOR));
    }

    #[test]
    fn game_over_floods_screen() {
        let (_, mut display, _) = fresh();
        paint_game_over(&mut display).unwrap();
        assert_eq!(display.clears(), &[BACKGROUND, GAME_OVER_COLOR]);
        assert_eq!(display.pixel(0, 0), Some(GAME_OVER_COLOR));
    }
}
