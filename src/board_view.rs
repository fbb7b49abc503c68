//! Tic-tac-toe painting.

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        iso_8859_1::FONT_6X10,
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        Circle,
        Line,
        PrimitiveStyle,
        PrimitiveStyleBuilder,
        Rectangle,
    },
    text::Text,
};

use crate::{
    config::{
        GRID_SIZE,
        POSITIONS,
    },
    grid::{
        GridState,
        Outcome,
        Player,
        row_col_to_pos,
    },
};

const MARGIN: u32 = 4;
const MARK_INSET: u32 = 8;
const MARK_STROKE: u32 = 3;
const CURSOR_INSET: u32 = 2;

pub const BACKGROUND: Rgb565 = Rgb565::BLACK;
pub const GRID_LINE: Rgb565 = Rgb565::CSS_GRAY;
pub const WIN_HIGHLIGHT: Rgb565 = Rgb565::CSS_DARK_GREEN;
pub const HUMAN_MARK: Rgb565 = Rgb565::CYAN;
pub const AI_MARK: Rgb565 = Rgb565::CSS_ORANGE;
pub const CURSOR: Rgb565 = Rgb565::YELLOW;

/// Where the board sits on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardLayout {
    pub origin: Point,
    pub cell: u32,
}

impl BoardLayout {
    /// Largest square board that fits across the short side of `panel`,
    /// centred horizontally and pinned to the top.
    #[must_use]
    pub fn fit(panel: Size) -> Self {
        let side = panel.width.min(panel.height).saturating_sub(2 * MARGIN);
        let cell = side / GRID_SIZE as u32;
        let board = cell * GRID_SIZE as u32;
        let left = panel.width.saturating_sub(board) / 2;
        Self {
            origin: Point::new(to_i32(left), to_i32(MARGIN)),
            cell,
        }
    }

    #[must_use]
    pub fn cell_rect(&self, pos: usize) -> Rectangle {
        let row = pos / GRID_SIZE;
        let col = pos % GRID_SIZE;
        let step = to_i32(self.cell);
        Rectangle::new(
            self.origin + Point::new(to_i32(col as u32) * step, to_i32(row as u32) * step),
            Size::new_equal(self.cell),
        )
    }

    /// Baseline-left of the status line under the board.
    #[must_use]
    pub fn status_origin(&self) -> Point {
        self.origin + Point::new(0, to_i32(self.cell * GRID_SIZE as u32 + 12))
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Full board repaint: cells, marks, winning highlight and cursor.
pub fn paint_board<D>(display: &mut D, layout: &BoardLayout, grid: &GridState) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BACKGROUND)?;

    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let pos = row_col_to_pos(row, col);
            let Some(cell) = grid.cell(pos) else {
                continue;
            };
            let rect = layout.cell_rect(pos);

            let fill = if cell.winning { WIN_HIGHLIGHT } else { BACKGROUND };
            rect.into_styled(
                PrimitiveStyleBuilder::new()
                    .fill_color(fill)
                    .stroke_color(GRID_LINE)
                    .stroke_width(1)
                    .build(),
            )
            .draw(display)?;

            paint_mark(display, &rect, cell.player)?;
        }
    }

    if grid.cursor() < POSITIONS {
        layout
            .cell_rect(grid.cursor())
            .offset(-to_i32(CURSOR_INSET))
            .into_styled(PrimitiveStyle::with_stroke(CURSOR, 2))
            .draw(display)?;
    }
    Ok(())
}

fn paint_mark<D>(display: &mut D, cell: &Rectangle, player: Player) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let inner = cell.offset(-to_i32(MARK_INSET));
    let Some(bottom_right) = inner.bottom_right() else {
        return Ok(());
    };
    let top_left = inner.top_left;

    match player {
        Player::Empty => Ok(()),
        Player::Human => {
            let style = PrimitiveStyle::with_stroke(HUMAN_MARK, MARK_STROKE);
            Line::new(top_left, bottom_right)
                .into_styled(style)
                .draw(display)?;
            Line::new(
                Point::new(bottom_right.x, top_left.y),
                Point::new(top_left.x, bottom_right.y),
            )
            .into_styled(style)
            .draw(display)
        }
        Player::Ai => Circle::new(top_left, inner.size.width)
            .into_styled(PrimitiveStyle::with_stroke(AI_MARK, MARK_STROKE))
            .draw(display),
    }
}

/// Status line under the board.
pub fn paint_outcome<D>(display: &mut D, layout: &BoardLayout, outcome: Outcome) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let (msg, color) = match outcome {
        Outcome::InProgress => return Ok(()),
        Outcome::Won(Player::Human) => ("YOU WIN! Press A", Rgb565::GREEN),
        Outcome::Won(_) => ("AI WINS! Press A", Rgb565::RED),
        Outcome::Draw => ("DRAW! Press A", Rgb565::WHITE),
    };
    Text::new(msg, layout.status_origin(), MonoTextStyle::new(&FONT_6X10, color))
        .draw(display)?;
    Ok(())
}
