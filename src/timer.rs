use crate::domain::{Task, TimerState};
use crate::notifications::Alarm;
use crate::store::TaskStore;
use crate::ticker::Ticker;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

/// Duration threshold crossed by a running timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    Half,
    Full,
}

impl Threshold {
    /// Threshold hit by the task's current elapsed time, if any.
    /// Tasks without a planned duration never alarm.
    pub fn reached(task: &Task) -> Option<Self> {
        if task.duration == 0 {
            return None;
        }
        if task.time_spent == task.half_threshold() {
            Some(Self::Half)
        } else if task.time_spent == task.full_threshold() {
            Some(Self::Full)
        } else {
            None
        }
    }
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub task_id: Uuid,
    pub time_spent: u64,
    pub threshold: Option<Threshold>,
}

/// Drives the one-second tick and enforces a single running timer
pub struct TimerEngine<A: Alarm> {
    alarm: A,
    ticker: Ticker,
    active_elapsed: u64,
}

impl<A: Alarm> TimerEngine<A> {
    pub fn new(alarm: A) -> Self {
        Self::with_ticker(alarm, Ticker::every_second())
    }

    pub fn with_ticker(alarm: A, ticker: Ticker) -> Self {
        Self {
            alarm,
            ticker,
            active_elapsed: 0,
        }
    }

    /// Start or stop a task's timer
    ///
    /// Starting a timer stops whichever other timer was running. Stopping
    /// touches only the target. Returns the target's new state, or `None` if
    /// the ID is unknown.
    pub fn toggle_timer(&mut self, store: &mut TaskStore, id: Uuid) -> Option<TimerState> {
        let current = store.find(id)?.timer_state();

        let next = match current {
            TimerState::Stopped => {
                if let Some(previous) = store.active_id() {
                    info!(id = %previous, "Stopping timer");
                }
                store.start_exclusive(id);
                info!(id = %id, "Starting timer");
                TimerState::Running
            }
            TimerState::Running => {
                store.stop_timer(id);
                info!(id = %id, "Stopping timer");
                TimerState::Stopped
            }
        };

        self.refresh_active_elapsed(store);
        Some(next)
    }

    /// Advance the running task by one second and fire any threshold alarm
    ///
    /// Does nothing once the engine is stopped or when no timer is running.
    pub fn tick(&mut self, store: &mut TaskStore) -> Option<TickReport> {
        if !self.is_active() {
            return None;
        }

        let Some(task) = store.accrue_second() else {
            self.active_elapsed = 0;
            return None;
        };
        self.active_elapsed = task.time_spent;

        let threshold = Threshold::reached(&task);
        if let Some(threshold) = threshold {
            info!(id = %task.id, name = %task.name, ?threshold, "Timer threshold reached");
            self.alarm.fire_alarm();
        }

        Some(TickReport {
            task_id: task.id,
            time_spent: task.time_spent,
            threshold,
        })
    }

    /// Tick if one is due at `now`. Returns true if a tick happened.
    pub fn poll_at(&mut self, store: &mut TaskStore, now: Instant) -> bool {
        if !self.ticker.poll_at(now) {
            return false;
        }
        self.tick(store);
        true
    }

    pub fn poll(&mut self, store: &mut TaskStore) -> bool {
        self.poll_at(store, Instant::now())
    }

    /// Time until the next tick is due
    pub fn until_next_tick(&self) -> Duration {
        self.ticker.remaining()
    }

    /// Elapsed seconds of the running task, 0 when none is running
    pub fn active_elapsed(&self) -> u64 {
        self.active_elapsed
    }

    pub fn is_active(&self) -> bool {
        self.ticker.is_active()
    }

    /// Remove the tick source. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.ticker.cancel() {
            debug!("Timer engine stopped");
        }
    }

    #[cfg(test)]
    pub fn alarm(&self) -> &A {
        &self.alarm
    }

    /// Re-read the running task's elapsed time from the store
    pub fn refresh_active_elapsed(&mut self, store: &TaskStore) {
        self.active_elapsed = store
            .active_id()
            .and_then(|id| store.find(id))
            .map(|task| task.time_spent)
            .unwrap_or(0);
    }
}

impl<A: Alarm> Drop for TimerEngine<A> {
    fn drop(&mut self) {
        self.stop();
    }
}
