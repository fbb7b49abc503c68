//! # Pong controller
//!
//! Owns the game state, the periodic task table and the three adapters
//! (display, motion sensor, watchdog). One `poll` runs every task that is
//! due, strictly one after another:
//!
//! | Task        | Period          | Writes                                   |
//! |-------------|-----------------|------------------------------------------|
//! | watchdog    | 90 ms           | hardware watchdog                        |
//! | ball        | tick (16 ms)    | ball position/velocity, `reset_requested`|
//! | user paddle | tick            | `user_paddle_y`, dirty flag              |
//! | AI paddle   | 3 ticks         | `ai_paddle_y`, dirty flag                |
//! | repaint     | tick            | display, clears dirty flags              |
//!
//! Registration order is the run order for tasks due at the same instant,
//! so repaint always follows the physics of its tick.

use embassy_time::{
    Instant,
    Timer,
};
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::{
    config::{
        TILT_THRESHOLD_G,
        Timing,
    },
    physics::{
        self,
        BallOutcome,
    },
    render::{
        self,
        Painter,
    },
    scheduler::{
        ScheduleError,
        Scheduler,
        TaskControl,
        TaskHandle,
    },
    sensor::MotionSensor,
    state::{
        GameState,
        Playfield,
    },
    watchdog::{
        self,
        Watchdog,
    },
};

/// The periodic Pong tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PongTask {
    Watchdog,
    Ball,
    UserPaddle,
    AiPaddle,
    Repaint,
}

const TASK_SLOTS: usize = 5;

pub struct Pong<D, S, W> {
    state: GameState,
    field: Playfield,
    timing: Timing,
    painter: Painter,
    scheduler: Scheduler<PongTask, TASK_SLOTS>,
    repaint: Option<TaskHandle>,
    display: D,
    sensor: S,
    watchdog: W,
}

impl<D, S, W> Pong<D, S, W>
where
    D: DrawTarget<Color = Rgb565> + OriginDimensions,
    S: MotionSensor,
    W: Watchdog,
{
    /// Build the controller. The playfield is taken from the display size.
    pub fn new(display: D, sensor: S, watchdog: W, timing: Timing) -> Self {
        let field = Playfield::from_panel(display.size());
        Self {
            state: GameState::new(),
            field,
            timing,
            painter: Painter::new(),
            scheduler: Scheduler::new(),
            repaint: None,
            display,
            sensor,
            watchdog,
        }
    }

    /// Arm the watchdog, paint the empty table and register every task with
    /// its first run one period after `now`.
    ///
    /// # Errors
    /// [`ScheduleError::Full`] if called twice, [`ScheduleError::ZeroPeriod`]
    /// if any period in the [`Timing`] is zero.
    pub fn start(&mut self, now: Instant) -> Result<(), ScheduleError> {
        info!("starting pong on a {}x{} field", self.field.breadth, self.field.length);

        self.watchdog.enable(self.timing.watchdog_timeout);
        if self.painter.paint_initial(&mut self.display, &self.field).is_err() {
            warn!("initial paint failed");
        }

        let t = self.timing;
        self.scheduler
            .schedule_every(PongTask::Watchdog, t.watchdog_kick, now)?;
        self.scheduler.schedule_every(PongTask::Ball, t.tick, now)?;
        self.scheduler
            .schedule_every(PongTask::UserPaddle, t.tick, now)?;
        self.scheduler
            .schedule_every(PongTask::AiPaddle, t.ai_paddle, now)?;
        self.repaint = Some(self.scheduler.schedule_every(PongTask::Repaint, t.tick, now)?);
        Ok(())
    }

    /// Run every task due at `now`. Returns when the next one is due, or
    /// `None` once nothing is left to run.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        while let Some((handle, task)) = self.scheduler.next_due(now) {
            let control = self.run_task(task);
            self.scheduler.complete(handle, control);
        }
        self.scheduler.next_deadline()
    }

    /// Drive the game from the embassy timer. After a fatal miss the tasks
    /// wind down and this parks until the watchdog restarts the device.
    pub async fn run(&mut self) -> ! {
        if self.start(Instant::now()).is_err() {
            error!("pong tasks could not be scheduled");
        }
        loop {
            match self.poll(Instant::now()) {
                Some(deadline) => Timer::at(deadline).await,
                None => Timer::after(self.timing.watchdog_timeout).await,
            }
        }
    }

    fn run_task(&mut self, task: PongTask) -> TaskControl {
        trace!("run {}", task);
        match task {
            PongTask::Watchdog => watchdog::guard(&self.state, &mut self.watchdog),
            PongTask::Ball => self.ball_task(),
            PongTask::UserPaddle => {
                match self.sensor.read_accel() {
                    Ok(accel) => {
                        physics::tilt_user_paddle(
                            &mut self.state,
                            &self.field,
                            accel.x,
                            TILT_THRESHOLD_G,
                        );
                    }
                    Err(_) => warn!("accelerometer read failed"),
                }
                TaskControl::Continue
            }
            PongTask::AiPaddle => {
                physics::track_ball(&mut self.state, &self.field);
                TaskControl::Continue
            }
            PongTask::Repaint => {
                if self
                    .painter
                    .repaint(&mut self.display, &mut self.state, &self.field)
                    .is_err()
                {
                    warn!("repaint failed");
                }
                TaskControl::Continue
            }
        }
    }

    fn ball_task(&mut self) -> TaskControl {
        match physics::advance_ball(&mut self.state, &self.field) {
            BallOutcome::Moved => TaskControl::Continue,
            BallOutcome::Missed(side) => {
                warn!("ball missed on {} side, game over", side);
                self.game_over();
                TaskControl::Stop
            }
        }
    }

    /// Terminal path: stop repainting, flood the screen and leave the reset
    /// flag for the watchdog guard.
    fn game_over(&mut self) {
        if let Some(handle) = self.repaint.take() {
            self.scheduler.cancel(handle);
        }
        if render::paint_game_over(&mut self.display).is_err() {
            warn!("game over paint failed");
        }
        self.state.reset_requested = true;
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for setting up scenarios.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn field(&self) -> Playfield {
        self.field
    }

    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    #[must_use]
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    #[must_use]
    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }

    #[must_use]
    pub fn is_repainting(&self) -> bool {
        self.repaint
            .is_some_and(|handle| self.scheduler.is_active(handle))
    }
}

#[cfg(test)]
mod tests {
    use embassy_time::Duration;

    use super::*;
    use crate::{
        config::BALL_SIZE,
        mocks::{
            RecordingDisplay,
            RecordingWatchdog,
            ScriptedSensor,
        },
        render::{
            BALL_COLOR,
            GAME_OVER_COLOR,
        },
        sensor::Accel,
        state::Heading,
    };

    type TestPong = Pong<RecordingDisplay, ScriptedSensor, RecordingWatchdog>;

    fn started(sensor: ScriptedSensor) -> TestPong {
        let mut pong = Pong::new(
            RecordingDisplay::new(128, 160),
            sensor,
            RecordingWatchdog::default(),
            Timing::default(),
        );
        pong.start(Instant::from_millis(0)).unwrap();
        pong
    }

    fn run_until(pong: &mut TestPong, end_ms: u64) {
        let mut now = Instant::from_millis(0);
        let end = Instant::from_millis(end_ms);
        while let Some(next) = pong.poll(now) {
            if next > end {
                break;
            }
            now = next;
        }
    }

    #[test]
    fn start_arms_watchdog_and_paints_table() {
        let pong = started(ScriptedSensor::level());
        assert_eq!(pong.watchdog().timeout, Some(Duration::from_millis(100)));
        assert_eq!(pong.field(), Playfield::new(128, 160));
        assert_eq!(pong.display().clears().len(), 1);
        assert!(pong.is_repainting());
    }

    #[test]
    fn one_tick_moves_ball_then_repaints_it() {
        let mut pong = started(ScriptedSensor::level());
        assert_eq!(pong.poll(Instant::from_millis(16)), Some(Instant::from_millis(32)));

        let state = pong.state();
        assert_eq!((state.ball_x, state.ball_y), (81, 36));
        assert!(!state.user_paddle_dirty && !state.ai_paddle_dirty);

        // Ball now at panel x 128 - 5 - 36 = 87, panel y 81.
        assert_eq!(pong.display().pixel(87, 81), Some(BALL_COLOR));
        assert_eq!(pong.display().count(BALL_COLOR), usize::from(BALL_SIZE * BALL_SIZE));
    }

    #[test]
    fn ai_paddle_runs_every_third_tick() {
        let mut pong = started(ScriptedSensor::level());
        let before = pong.state().ai_paddle_y;
        pong.poll(Instant::from_millis(16));
        pong.poll(Instant::from_millis(32));
        assert_eq!(pong.state().ai_paddle_y, before);
        pong.poll(Instant::from_millis(48));
        assert_ne!(pong.state().ai_paddle_y, before);
    }

    #[test]
    fn tilt_moves_user_paddle() {
        let mut pong = started(ScriptedSensor::new([Accel::new(0.8, 0.0, 1.0)]));
        pong.poll(Instant::from_millis(16));
        assert_eq!(pong.state().user_paddle_y, 2);
        assert_eq!(pong.sensor().reads, 1);
    }

    #[test]
    fn watchdog_is_kicked_while_playing() {
        let mut pong = started(ScriptedSensor::level());
        run_until(&mut pong, 400);
        assert_eq!(pong.watchdog().kicks, 4);
        assert!(!pong.watchdog().fatal_reset);
    }

    #[test]
    fn miss_ends_game_and_starves_watchdog() {
        let mut pong = started(ScriptedSensor::level());
        {
            let state = pong.state_mut();
            state.ball_x = 9;
            state.ball_y = 90;
            state.ball_vel_x = Heading::Negative;
            state.user_paddle_y = 0;
        }

        pong.poll(Instant::from_millis(16));
        assert!(pong.state().reset_requested);
        assert!(!pong.is_repainting());
        assert_eq!(pong.display().clears().last(), Some(&GAME_OVER_COLOR));
        assert_eq!(pong.display().count(GAME_OVER_COLOR), 128 * 160);

        let kicks = pong.watchdog().kicks;
        run_until(&mut pong, 1_000);
        assert_eq!(pong.watchdog().kicks, kicks);
        assert!(pong.watchdog().fatal_reset);
        // Only the paddle tasks remain.
        assert!(pong.poll(Instant::from_millis(1_000)).is_some());
    }

    #[test]
    fn zero_tick_is_refused_at_start() {
        let timing = Timing {
            tick: Duration::from_ticks(0),
            ..Timing::default()
        };
        let mut pong = Pong::new(
            RecordingDisplay::new(128, 160),
            ScriptedSensor::level(),
            RecordingWatchdog::default(),
            timing,
        );
        assert_eq!(pong.start(Instant::from_millis(0)), Err(ScheduleError::ZeroPeriod));
        // Only the watchdog made it in, so polling still returns.
        assert_eq!(pong.poll(Instant::from_millis(90)), Some(Instant::from_millis(180)));
        assert!(!pong.is_repainting());
    }

    #[test]
    fn display_failure_does_not_stop_the_game() {
        let mut pong = started(ScriptedSensor::level());
        pong.display.fail = true;
        run_until(&mut pong, 160);
        assert!(pong.is_repainting());
        assert!(pong.state().ball_x > 80);
    }
}
