//! # Tick Task Core Types
//!
//! This module defines the building blocks of the tick scheduler.
//!
//! ## Core Components
//! - `TickTask`: a unit of work that runs a bounded slice of itself once per tick
//! - `TaskStatus`: what a task reports after each slice
//! - `TaskState` and `TaskHandle`: the caller's view of a scheduled task
//!
//! ## Task Lifecycle
//! 1. A `TickTask` is registered with `TickScheduler::schedule()` and is `Pending`
//! 2. On each tick the scheduler calls `run_tick()` once; the task is `Running`
//! 3. When `run_tick()` returns `TaskStatus::Finished` the task is `Completed` and dropped
//! 4. A `TaskHandle::cancel()` before that point makes it `Cancelled`; it never runs again

use std::fmt;

use crate::core::StResource;

/// A periodic unit of work driven by the tick scheduler.
///
/// # Implementation Guidelines
/// - `run_tick()` must return quickly; the whole tick shares one time budget
/// - Work that does not fit in one tick is carried over to the next call
/// - Errors are handled inside the task; only panics are caught by the scheduler
pub trait TickTask {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Runs one slice of work.
    ///
    /// # Returns
    /// `TaskStatus::Continue` to be called again next tick, `TaskStatus::Finished` to stop.
    fn run_tick(&mut self) -> TaskStatus;

    /// Called once if the task is cancelled before finishing.
    fn on_cancel(&mut self) {}
}

/// Result of one `TickTask::run_tick()` call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// More work remains; run again next tick.
    Continue,
    /// The task is done and must not be called again.
    Finished,
}

/// Lifecycle state of a scheduled task.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Registered, waiting for its first tick.
    Pending,
    /// Has run at least once and is not finished.
    Running,
    /// Reported `TaskStatus::Finished`.
    Completed,
    /// Stopped through `TaskHandle::cancel()`.
    Cancelled,
    /// Panicked during a tick and was dropped.
    Failed,
}

impl TaskState {
    /// Whether the task will never run again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Cancelled | TaskState::Failed
        )
    }
}

/// The caller's handle on a scheduled task.
///
/// Cloning the handle is cheap; every clone observes the same task.
#[derive(Clone)]
pub struct TaskHandle {
    id: u64,
    state: StResource<TaskState>,
}

impl TaskHandle {
    pub(crate) fn new(id: u64, state: StResource<TaskState>) -> Self {
        TaskHandle { id, state }
    }

    /// Scheduler-unique id of the task.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        *self.state.get()
    }

    /// Stops the task before its next tick.
    ///
    /// # Returns
    /// `true` if the task was still live, `false` if it had already ended.
    pub fn cancel(&self) -> bool {
        let mut state = self.state.get_mut();
        if state.is_terminal() {
            return false;
        }
        *state = TaskState::Cancelled;
        true
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}
