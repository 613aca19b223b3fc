//! # Tick Scheduler
//!
//! This module provides the periodic driver that stands in for a game server's
//! tick loop. Registered tasks get exactly one `run_tick()` call per tick, in
//! registration order, all on the calling thread.
//!
//! ## Architecture Overview
//! - `TickScheduler`: owns the registered tasks and advances them one tick at a time
//! - `TickTask`: a unit of work that does a bounded slice per tick
//! - `TaskHandle`: lets the caller observe or cancel a task
//!
//! ## Driving the Scheduler
//! The host either calls `tick()` from its own loop, or hands control to
//! `run_at_fixed_rate()`, which ticks on a fixed period until no task is left.
//! Two ticks never overlap, so a task never runs concurrently with itself.
//!
//! ## Fault Isolation
//! A panicking task is caught, logged, marked `Failed` and dropped. The other
//! tasks keep running.
//!
//! ## Example Usage
//! ```rust
//! use mass_block_update::engine_state::task_management::{
//!     task::{TaskStatus, TickTask},
//!     TickScheduler,
//! };
//!
//! struct Countdown(u32);
//!
//! impl TickTask for Countdown {
//!     fn name(&self) -> &str {
//!         "countdown"
//!     }
//!
//!     fn run_tick(&mut self) -> TaskStatus {
//!         self.0 -= 1;
//!         if self.0 == 0 { TaskStatus::Finished } else { TaskStatus::Continue }
//!     }
//! }
//!
//! let mut scheduler = TickScheduler::new();
//! scheduler.schedule(Box::new(Countdown(3)));
//! assert_eq!(scheduler.run_until_idle(10), 3);
//! ```

pub mod task;

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use task::{TaskHandle, TaskState, TaskStatus, TickTask};
use web_time::Instant;

use crate::core::StResource;

/// A task registered with the scheduler together with its shared state.
struct ScheduledTask {
    id: u64,
    task: Box<dyn TickTask>,
    state: StResource<TaskState>,
}

/// Runs registered tasks once per tick.
pub struct TickScheduler {
    tasks: Vec<ScheduledTask>,
    next_id: u64,
    ticks: u64,
}

impl TickScheduler {
    /// Creates a scheduler with no tasks.
    pub fn new() -> Self {
        TickScheduler {
            tasks: Vec::new(),
            next_id: 0,
            ticks: 0,
        }
    }

    /// Registers a task. It first runs on the next call to `tick()`.
    ///
    /// # Returns
    /// A handle for observing or cancelling the task.
    pub fn schedule(&mut self, task: Box<dyn TickTask>) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;

        let state = StResource::new(TaskState::Pending);
        log::debug!("Scheduled task '{}' with id {}", task.name(), id);
        self.tasks.push(ScheduledTask {
            id,
            task,
            state: state.clone(),
        });

        TaskHandle::new(id, state)
    }

    /// Runs one tick: every live task gets one `run_tick()` call.
    ///
    /// Cancelled tasks are dropped without running. Finished and panicking tasks
    /// are dropped after their call.
    pub fn tick(&mut self) {
        self.ticks += 1;
        let tick = self.ticks;

        self.tasks.retain_mut(|scheduled| {
            if *scheduled.state.get() == TaskState::Cancelled {
                log::debug!(
                    "Dropping cancelled task '{}' ({})",
                    scheduled.task.name(),
                    scheduled.id
                );
                scheduled.task.on_cancel();
                return false;
            }

            *scheduled.state.get_mut() = TaskState::Running;
            let task = &mut scheduled.task;
            match panic::catch_unwind(AssertUnwindSafe(|| task.run_tick())) {
                Ok(TaskStatus::Continue) => true,
                Ok(TaskStatus::Finished) => {
                    log::trace!("Task '{}' finished on tick {}", scheduled.task.name(), tick);
                    *scheduled.state.get_mut() = TaskState::Completed;
                    false
                }
                Err(_) => {
                    log::error!(
                        "Task '{}' ({}) panicked on tick {} and was dropped",
                        scheduled.task.name(),
                        scheduled.id,
                        tick
                    );
                    *scheduled.state.get_mut() = TaskState::Failed;
                    false
                }
            }
        });
    }

    /// Ticks until no task is left or `max_ticks` ticks have run.
    ///
    /// # Returns
    /// The number of ticks executed by this call.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> u64 {
        let mut executed = 0;
        while !self.is_idle() && executed < max_ticks {
            self.tick();
            executed += 1;
        }
        executed
    }

    /// Ticks every `period` until no task is left or `max_ticks` ticks have run.
    ///
    /// A tick that overruns its period is followed immediately by the next one;
    /// the lost time is not made up.
    ///
    /// # Returns
    /// The number of ticks executed by this call.
    pub fn run_at_fixed_rate(&mut self, period: Duration, max_ticks: Option<u64>) -> u64 {
        let mut executed = 0;
        while !self.is_idle() && max_ticks.map_or(true, |max| executed < max) {
            let started = Instant::now();
            self.tick();
            executed += 1;

            let elapsed = started.elapsed();
            if elapsed < period {
                std::thread::sleep(period - elapsed);
            } else {
                log::debug!("Tick {} overran its period: {:?}", self.ticks, elapsed);
            }
        }
        executed
    }

    /// Whether no task is registered.
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of registered tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of ticks run since the scheduler was created.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}
