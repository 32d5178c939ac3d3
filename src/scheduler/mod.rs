//! Cooperative task scheduler.
//!
//! Portable, single threaded scheduling without async/await. Tasks are
//! resumable state machines: each [`Task::resume`] runs until the task's
//! next suspension point and returns a [`Tick`] telling the scheduler when
//! to resume it again.
//!
//! # Usage
//!
//! ```ignore
//! let mut scheduler = Scheduler::<_, 4>::new(EmbassyClock, SchedulerConfig::default())
//!     .with_resources(&POOL);
//! scheduler.register(&mut strip)?;
//! scheduler.register_with_handler(&mut button, report)?;
//! scheduler.run_forever()?;
//! ```

mod deadline;

pub use deadline::Deadline;
use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::error::{SchedulerError, TaskError, TooManyTasksSnafu};
use crate::event::Event;
use crate::hw::ResourcePool;

/// Source of time for the scheduler.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Block until `deadline`; returns at once if it has passed.
    fn sleep_until(&mut self, deadline: Instant);
}

/// Wall clock backed by the `embassy-time` driver, sleeping by busy waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining > Duration::from_ticks(0) {
            embassy_time::block_for(remaining);
        }
    }
}

/// What a task asks for when it suspends.
#[derive(Debug, Clone, Copy)]
pub enum Tick {
    /// Resume `ms` milliseconds after the previous deadline.
    Delay(u32),
    /// Resume once the event is set; timing restarts from the wake-up.
    Await(&'static Event),
    /// The task has finished and is retired.
    Done,
}

/// A resumable unit of work.
pub trait Task {
    fn resume(&mut self) -> Result<Tick, TaskError>;
}

/// Receives the error of a task registered with a handler; the task is
/// then retired.
pub type ErrorHandler = fn(&TaskError);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Task resumes between two housekeeping hook calls.
    pub housekeeping_interval: u32,
    /// Polling period for events while no timed task is due earlier.
    pub idle_poll: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            housekeeping_interval: 1,
            idle_poll: Duration::from_millis(1),
        }
    }
}

#[derive(Clone, Copy)]
enum TaskState {
    /// Registered, baseline not yet taken.
    Pending,
    Ready,
    Waiting(&'static Event),
    Finished,
}

struct TaskSlot<'a> {
    task: &'a mut dyn Task,
    handler: Option<ErrorHandler>,
    deadline: Deadline,
    state: TaskState,
}

/// Releases every claimed hardware resource when the run loop exits,
/// including by unwinding.
struct ShutdownGuard<'a> {
    pool: Option<&'a ResourcePool>,
}

impl Drop for ShutdownGuard<'_> {
    fn drop(&mut self) {
        log::info!("scheduler shutting down");
        if let Some(pool) = self.pool {
            pool.release_all();
        }
    }
}

pub struct Scheduler<'a, C: Clock, const N: usize> {
    clock: C,
    config: SchedulerConfig,
    tasks: Vec<TaskSlot<'a>, N>,
    housekeeping: Option<&'a mut dyn FnMut()>,
    since_housekeeping: u32,
    pool: Option<&'a ResourcePool>,
}

impl<'a, C: Clock, const N: usize> Scheduler<'a, C, N> {
    pub fn new(clock: C, config: SchedulerConfig) -> Self {
        Self {
            clock,
            config,
            tasks: Vec::new(),
            housekeeping: None,
            since_housekeeping: 0,
            pool: None,
        }
    }

    /// Call `hook` every `housekeeping_interval` task resumes.
    #[must_use]
    pub fn with_housekeeping(mut self, hook: &'a mut dyn FnMut()) -> Self {
        self.housekeeping = Some(hook);
        self
    }

    /// Release the pool's claims when the scheduler shuts down.
    #[must_use]
    pub fn with_resources(mut self, pool: &'a ResourcePool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Add a task whose errors end the run loop.
    pub fn register(&mut self, task: &'a mut dyn Task) -> Result<(), SchedulerError> {
        self.push(task, None)
    }

    /// Add a task whose errors go to `handler`.
    pub fn register_with_handler(&mut self, task: &'a mut dyn Task, handler: ErrorHandler) -> Result<(), SchedulerError> {
        self.push(task, Some(handler))
    }

    fn push(&mut self, task: &'a mut dyn Task, handler: Option<ErrorHandler>) -> Result<(), SchedulerError> {
        let slot = TaskSlot {
            task,
            handler,
            deadline: Deadline::new(Instant::from_ticks(0)),
            state: TaskState::Pending,
        };
        self.tasks
            .push(slot)
            .map_err(|_| TooManyTasksSnafu { capacity: N }.build())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Number of tasks not yet finished.
    pub fn live_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|slot| !matches!(slot.state, TaskState::Finished))
            .count()
    }

    /// Run one scheduling pass.
    ///
    /// Every due task is resumed once. Returns the instant the next task
    /// becomes due, or `None` when no live task remains.
    pub fn step(&mut self) -> Result<Option<Instant>, TaskError> {
        let now = self.clock.now();
        let mut next: Option<Instant> = None;
        let mut waiting = false;

        for slot in &mut self.tasks {
            match slot.state {
                TaskState::Finished => continue,
                TaskState::Pending => {
                    slot.deadline.reset(now);
                    slot.state = TaskState::Ready;
                }
                TaskState::Waiting(event) => {
                    if !event.is_set() {
                        waiting = true;
                        continue;
                    }
                    slot.deadline.reset(now);
                    slot.state = TaskState::Ready;
                }
                TaskState::Ready => {}
            }

            if slot.deadline.is_due(now) {
                match slot.task.resume() {
                    Ok(Tick::Delay(ms)) => {
                        slot.deadline.advance(ms);
                    }
                    Ok(Tick::Await(event)) => slot.state = TaskState::Waiting(event),
                    Ok(Tick::Done) => slot.state = TaskState::Finished,
                    Err(error) => match slot.handler {
                        Some(handler) => {
                            log::warn!("task failed: {}", error);
                            handler(&error);
                            slot.state = TaskState::Finished;
                        }
                        None => return Err(error),
                    },
                }

                self.since_housekeeping += 1;
                if self.since_housekeeping >= self.config.housekeeping_interval {
                    self.since_housekeeping = 0;
                    if let Some(hook) = self.housekeeping.as_mut() {
                        hook();
                    }
                }
            }

            match slot.state {
                TaskState::Ready => {
                    let at = slot.deadline.at();
                    next = Some(next.map_or(at, |current| current.min(at)));
                }
                // already set events are picked up without sleeping
                TaskState::Waiting(event) if event.is_set() => next = Some(now),
                TaskState::Waiting(_) => waiting = true,
                TaskState::Pending | TaskState::Finished => {}
            }
        }

        if waiting {
            let poll = now + self.config.idle_poll;
            next = Some(next.map_or(poll, |current| current.min(poll)));
        }
        Ok(next)
    }

    /// Drive all tasks until every task has finished or one fails without
    /// a handler.
    ///
    /// Claimed hardware is released on every exit path.
    pub fn run_forever(&mut self) -> Result<(), TaskError> {
        let _guard = ShutdownGuard { pool: self.pool };
        log::info!("scheduler started with {} tasks", self.tasks.len());
        while let Some(wake) = self.step()? {
            self.clock.sleep_until(wake);
        }
        Ok(())
    }

    /// Drive tasks until the next wake-up would fall after `end`.
    ///
    /// Claimed resources are kept, so a run can be continued.
    pub fn run_until(&mut self, end: Instant) -> Result<(), TaskError> {
        while let Some(wake) = self.step()? {
            if wake > end {
                break;
            }
            self.clock.sleep_until(wake);
        }
        Ok(())
    }
}
