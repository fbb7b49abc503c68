//! Tic-tac-toe front end: input events in, board repaints out.

use embassy_futures::select::{
    Either,
    select,
};
use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::Receiver,
};
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::{
    board_view::{
        self,
        BoardLayout,
    },
    grid::{
        GridState,
        Move,
        Outcome,
    },
    input::PressSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardEvent {
    /// The play button.
    Press,
    /// A cursor move from the tilt sampler.
    Move(Move),
}

pub struct TicTacToe<D> {
    grid: GridState,
    outcome: Outcome,
    layout: BoardLayout,
    display: D,
}

impl<D> TicTacToe<D>
where
    D: DrawTarget<Color = Rgb565> + OriginDimensions,
{
    pub fn new(display: D) -> Self {
        let layout = BoardLayout::fit(display.size());
        Self {
            grid: GridState::new(),
            outcome: Outcome::InProgress,
            layout,
            display,
        }
    }

    /// Paint the empty board.
    pub fn start(&mut self) {
        info!("starting tic-tac-toe");
        self.repaint();
    }

    /// Apply one input event and repaint if anything changed.
    ///
    /// A press plays at the cursor, or starts a new round once the current
    /// one is over. Cursor moves are ignored between rounds.
    pub fn handle(&mut self, event: BoardEvent) -> Outcome {
        let changed = match event {
            BoardEvent::Press if self.outcome.is_over() => {
                self.grid.reset();
                self.outcome = Outcome::InProgress;
                true
            }
            BoardEvent::Press => match self.grid.human_turn() {
                Ok(outcome) => {
                    if outcome.is_over() {
                        info!("round over: {}", outcome);
                    }
                    self.outcome = outcome;
                    true
                }
                Err(_) => false,
            },
            BoardEvent::Move(_) if self.outcome.is_over() => false,
            BoardEvent::Move(direction) => self.grid.move_cursor(direction).is_ok(),
        };

        if changed {
            self.repaint();
        }
        self.outcome
    }

    /// Serve events forever: presses from `press`, moves from `moves`.
    pub async fn run<P, M, const N: usize>(&mut self, press: &mut P, moves: Receiver<'_, M, Move, N>) -> !
    where
        P: PressSource,
        M: RawMutex,
    {
        self.start();
        loop {
            let event = match select(press.wait_for_press(), moves.receive()).await {
                Either::First(()) => BoardEvent::Press,
                Either::Second(direction) => BoardEvent::Move(direction),
            };
            self.handle(event);
        }
    }

    fn repaint(&mut self) {
        let painted = board_view::paint_board(&mut self.display, &self.layout, &self.grid)
            .and_then(|()| board_view::paint_outcome(&mut self.display, &self.layout, self.outcome));
        if painted.is_err() {
            warn!("board repaint failed");
        }
    }

    #[must_use]
    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::{
        block_on,
        yield_now,
    };
    use embassy_sync::{
        blocking_mutex::raw::CriticalSectionRawMutex,
        channel::Channel,
    };

    use super::*;
    use crate::{
        config::INPUT_QUEUE_DEPTH,
        grid::Player,
        mocks::{
            QueuedPresses,
            RecordingDisplay,
        },
    };

    type Moves = Channel<CriticalSectionRawMutex, Move, INPUT_QUEUE_DEPTH>;
    type Presses = Channel<CriticalSectionRawMutex, (), 4>;

    /// Give the board task a few polls to drain its inputs.
    async fn settle() {
        for _ in 0..8 {
            yield_now().await;
        }
    }

    fn game() -> TicTacToe<RecordingDisplay> {
        let mut game = TicTacToe::new(RecordingDisplay::new(128, 160));
        game.start();
        game
    }

    fn player_at(game: &TicTacToe<RecordingDisplay>, pos: usize) -> Option<Player> {
        game.grid().cell(pos).map(|cell| cell.player)
    }

    #[test]
    fn start_paints_once() {
        let game = game();
        assert_eq!(game.display().clears().len(), 1);
    }

    #[test]
    fn press_plays_and_ai_answers() {
        let mut game = game();
        game.handle(BoardEvent::Move(Move::Down));
        game.handle(BoardEvent::Move(Move::Right));
        assert_eq!(game.handle(BoardEvent::Press), Outcome::InProgress);
        assert_eq!(player_at(&game, 4), Some(Player::Human));
        assert_eq!(player_at(&game, 0), Some(Player::Ai));
    }

    #[test]
    fn rejected_input_does_not_repaint() {
        let mut game = game();
        game.handle(BoardEvent::Move(Move::Left));
        assert_eq!(game.display().clears().len(), 1);

        game.handle(BoardEvent::Press);
        let repaints = game.display().clears().len();
        // Cursor is on the human's own cell now.
        game.handle(BoardEvent::Press);
        assert_eq!(game.display().clears().len(), repaints);
    }

    #[test]
    fn full_round_then_restart() {
        let mut game = game();
        // Human 0, AI 1; human 3, AI 2; human 6 completes column 0.
        game.handle(BoardEvent::Press);
        game.handle(BoardEvent::Move(Move::Down));
        game.handle(BoardEvent::Press);
        game.handle(BoardEvent::Move(Move::Down));
        assert_eq!(game.handle(BoardEvent::Press), Outcome::Won(Player::Human));

        // Moves are ignored until the next press starts a new round.
        let repaints = game.display().clears().len();
        game.handle(BoardEvent::Move(Move::Up));
        assert_eq!(game.display().clears().len(), repaints);

        assert_eq!(game.handle(BoardEvent::Press), Outcome::InProgress);
        assert_eq!(game.grid(), &GridState::new());
    }

    #[test]
    fn run_turns_queued_input_into_turns() {
        let moves = Moves::new();
        let presses = Presses::new();
        moves.try_send(Move::Down).unwrap();
        moves.try_send(Move::Right).unwrap();

        let mut button = QueuedPresses::new(presses.receiver());
        let mut game = TicTacToe::new(RecordingDisplay::new(128, 160));
        let _ = block_on(select(game.run(&mut button, moves.receiver()), async {
            settle().await;
            presses.try_send(()).unwrap();
            settle().await;
        }));

        assert_eq!(game.grid().cursor(), 4);
        assert_eq!(player_at(&game, 4), Some(Player::Human));
        assert_eq!(player_at(&game, 0), Some(Player::Ai));
        assert_eq!(button.reported, 1);
    }

    #[test]
    fn tilting_while_a_is_held_keeps_the_press() {
        let moves = Moves::new();
        let presses = Presses::new();
        // Press lands together with two tilts; the button is never released.
        presses.try_send(()).unwrap();
        moves.try_send(Move::Down).unwrap();
        moves.try_send(Move::Right).unwrap();

        let mut button = QueuedPresses::new(presses.receiver());
        let mut game = TicTacToe::new(RecordingDisplay::new(128, 160));
        let _ = block_on(select(game.run(&mut button, moves.receiver()), async {
            settle().await;
            moves.try_send(Move::Down).unwrap();
            settle().await;
        }));

        assert_eq!(player_at(&game, 0), Some(Player::Human));
        assert_eq!(player_at(&game, 1), Some(Player::Ai));
        assert_eq!(game.grid().cursor(), 7);
        assert_eq!(button.reported, 1);
        assert!(moves.try_receive().is_err());
    }
}
