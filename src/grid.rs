//! Tic-tac-toe board: human against a first-free-cell AI.

use core::fmt;

use crate::config::{
    GRID_SIZE,
    LAST_POSITION,
    POSITIONS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Player {
    #[default]
    Empty,
    Human,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell {
    pub player: Player,
    /// Part of the winning line, for highlighting once the round is over.
    pub winning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    InProgress,
    Won(Player),
    Draw,
}

impl Outcome {
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Cursor direction, as delivered by the tilt sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayError {
    Occupied(usize),
    OutOfRange(usize),
    GameOver,
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Occupied(pos) => write!(f, "cannot play at position {pos}: occupied"),
            Self::OutOfRange(pos) => write!(f, "cannot play at position {pos}: off the board"),
            Self::GameOver => f.write_str("the round is over"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CursorError {
    pub from: usize,
    pub direction: Move,
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cursor cannot move {:?} from position {}", self.direction, self.from)
    }
}

/// Board position of `(row, col)`.
#[must_use]
pub const fn row_col_to_pos(row: usize, col: usize) -> usize {
    row * GRID_SIZE + col
}

/// Every line that wins: rows, columns, then both diagonals.
pub const LINES: [[usize; GRID_SIZE]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    cells: [Cell; POSITIONS],
    cursor: usize,
}

impl GridState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [Cell {
                player: Player::Empty,
                winning: false,
            }; POSITIONS],
            cursor: 0,
        }
    }

    /// Board from a row-major list of occupants.
    #[must_use]
    pub fn from_players(players: [Player; POSITIONS]) -> Self {
        let mut grid = Self::new();
        for (cell, player) in grid.cells.iter_mut().zip(players) {
            cell.player = player;
        }
        grid
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell; POSITIONS] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn can_play_at(&self, pos: usize) -> bool {
        self.cells
            .get(pos)
            .is_some_and(|cell| cell.player == Player::Empty)
    }

    /// Put `player` on `pos`.
    ///
    /// # Errors
    /// The cell is taken or does not exist; the board is unchanged.
    pub fn play(&mut self, player: Player, pos: usize) -> Result<(), PlayError> {
        let cell = self.cells.get_mut(pos).ok_or(PlayError::OutOfRange(pos))?;
        if cell.player != Player::Empty {
            warn!("cannot play at position {}", pos);
            return Err(PlayError::Occupied(pos));
        }
        cell.player = player;
        Ok(())
    }

    /// First empty cell in board order.
    #[must_use]
    pub fn next_free(&self) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.player == Player::Empty)
    }

    /// Where the AI will play. A deliberately naive choice.
    #[must_use]
    pub fn ai_play(&self) -> Option<usize> {
        self.next_free()
    }

    /// The first complete line, if any.
    #[must_use]
    pub fn winning_line(&self) -> Option<[usize; GRID_SIZE]> {
        LINES.into_iter().find(|line| {
            let first = self.cells[line[0]].player;
            first != Player::Empty && line.iter().all(|&pos| self.cells[pos].player == first)
        })
    }

    /// Owner of a complete line, or [`Player::Empty`].
    #[must_use]
    pub fn winner(&self) -> Player {
        self.winning_line()
            .map_or(Player::Empty, |line| self.cells[line[0]].player)
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match self.winner() {
            Player::Empty if self.next_free().is_none() => Outcome::Draw,
            Player::Empty => Outcome::InProgress,
            player => Outcome::Won(player),
        }
    }

    /// Move the cursor one cell. Moves off the board are rejected and
    /// logged; the cursor stays put.
    ///
    /// # Errors
    /// [`CursorError`] naming the blocked direction.
    pub fn move_cursor(&mut self, direction: Move) -> Result<usize, CursorError> {
        let row = self.cursor / GRID_SIZE;
        let col = self.cursor % GRID_SIZE;
        let next = match direction {
            Move::Left if col > 0 => Some(self.cursor - 1),
            Move::Right if col < GRID_SIZE - 1 => Some(self.cursor + 1),
            Move::Up if row > 0 => Some(self.cursor - GRID_SIZE),
            Move::Down if row < GRID_SIZE - 1 => Some(self.cursor + GRID_SIZE),
            _ => None,
        };

        match next {
            Some(pos) if pos <= LAST_POSITION => {
                self.cursor = pos;
                Ok(pos)
            }
            _ => {
                warn!("cursor cannot move {} from {}", direction, self.cursor);
                Err(CursorError {
                    from: self.cursor,
                    direction,
                })
            }
        }
    }

    /// Human plays at the cursor, then the AI answers unless the human's
    /// move ended the round. Winning cells are flagged when a round is won.
    ///
    /// # Errors
    /// The round is already over or the cursor cell is taken.
    pub fn human_turn(&mut self) -> Result<Outcome, PlayError> {
        if self.outcome().is_over() {
            return Err(PlayError::GameOver);
        }
        self.play(Player::Human, self.cursor)?;

        let mut outcome = self.outcome();
        if !outcome.is_over() {
            if let Some(pos) = self.ai_play() {
                self.play(Player::Ai, pos)?;
                debug!("ai played {}", pos);
            }
            outcome = self.outcome();
        }

        if let Some(line) = self.winning_line() {
            for pos in line {
                self.cells[pos].winning = true;
            }
        }
        Ok(outcome)
    }
}

impl Default for GridState {
    fn default() -> Self {
        Self::new()
    }
}
