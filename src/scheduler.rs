//! # Periodic run queue
//!
//! A single-threaded table of periodic tasks. The owner asks for the next
//! due task, runs it, and reports back; only one task body runs at a time,
//! so tasks that share state never overlap.
//!
//! ## Ordering
//!
//! When several tasks are due, the one with the earliest deadline runs first
//! and ties go to the task registered first. Registering physics before
//! repaint therefore guarantees repaint sees the tick's final positions.
//!
//! ## Overruns
//!
//! A task that falls more than one period behind is not replayed; its next
//! deadline is re-anchored one period after `now`.

use core::fmt;

use embassy_time::{
    Duration,
    Instant,
};
use heapless::Vec;

/// What a task tells the scheduler after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskControl {
    /// Keep the task scheduled.
    Continue,
    /// Cancel the task.
    Stop,
}

/// Handle returned by registration, used to cancel a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHandle(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// Every slot is taken.
    Full,
    /// A task must wait at least one timer tick between runs.
    ZeroPeriod,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("scheduler slot table is full"),
            Self::ZeroPeriod => f.write_str("task period must be non-zero"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot<K> {
    kind: K,
    period: Duration,
    next_run: Instant,
    active: bool,
}

/// Run queue holding up to `N` periodic tasks identified by `K`.
pub struct Scheduler<K, const N: usize> {
    slots: Vec<Slot<K>, N>,
}

impl<K: Copy, const N: usize> Scheduler<K, N> {
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register `kind` to run first at `first_run`, then every `period`.
    ///
    /// # Errors
    /// [`ScheduleError::Full`] when all `N` slots are in use. Cancelled slots
    /// are not reused. [`ScheduleError::ZeroPeriod`] for a zero `period`,
    /// which would make the task due forever.
    pub fn schedule_periodic(
        &mut self,
        kind: K,
        period: Duration,
        first_run: Instant,
    ) -> Result<TaskHandle, ScheduleError> {
        if period == Duration::from_ticks(0) {
            return Err(ScheduleError::ZeroPeriod);
        }
        let index = u8::try_from(self.slots.len()).map_err(|_| ScheduleError::Full)?;
        self.slots
            .push(Slot {
                kind,
                period,
                next_run: first_run,
                active: true,
            })
            .map_err(|_| ScheduleError::Full)?;
        Ok(TaskHandle(index))
    }

    /// Register `kind` to run one `period` after `now` and every `period`
    /// after that.
    ///
    /// # Errors
    /// See [`Scheduler::schedule_periodic`].
    pub fn schedule_every(
        &mut self,
        kind: K,
        period: Duration,
        now: Instant,
    ) -> Result<TaskHandle, ScheduleError> {
        self.schedule_periodic(kind, period, now + period)
    }

    /// Stop running a task. Returns `false` if it was already cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.slots.get_mut(usize::from(handle.0)) {
            Some(slot) if slot.active => {
                slot.active = false;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_active(&self, handle: TaskHandle) -> bool {
        self.slots
            .get(usize::from(handle.0))
            .is_some_and(|slot| slot.active)
    }

    /// Pop the next task due at or before `now` and move its deadline on by
    /// one period. The caller runs it and passes the result to
    /// [`Scheduler::complete`].
    pub fn next_due(&mut self, now: Instant) -> Option<(TaskHandle, K)> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.active && slot.next_run <= now)
            .min_by_key(|(index, slot)| (slot.next_run, *index))?;

        slot.next_run += slot.period;
        if slot.next_run <= now {
            slot.next_run = now + slot.period;
        }

        let handle = TaskHandle(u8::try_from(index).ok()?);
        Some((handle, slot.kind))
    }

    /// Apply a task's verdict.
    pub fn complete(&mut self, handle: TaskHandle, control: TaskControl) {
        if control == TaskControl::Stop {
            self.cancel(handle);
        }
    }

    /// Earliest deadline of any active task.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots
            .iter()
            .filter(|slot| slot.active)
            .map(|slot| slot.next_run)
            .min()
    }

    /// Number of tasks still scheduled.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }
}

impl<K: Copy, const N: usize> Default for Scheduler<K, N> {
    fn default() -> Self {
        Self::new()
    }
}
