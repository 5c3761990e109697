//! Scheduler Module
//!
//! Abstracts "run this later" so the cache never touches wall-clock timers
//! directly. Production code uses [`TokioScheduler`]; tests drive a
//! [`ManualScheduler`] whose clock only moves when told to.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

// == Scheduler Trait ==
/// Runs callbacks after a delay or as soon as possible.
pub trait Scheduler: Send + Sync + 'static {
    /// Runs `task` once `delay` has elapsed, unless the returned handle is
    /// cancelled first.
    fn schedule_after(&self, delay: Duration, task: Task) -> TimerHandle;

    /// Runs `task` asynchronously without blocking the caller.
    fn defer(&self, task: Task);
}

// == Timer Handle ==
/// Cancellation side of a scheduled timer.
pub trait CancelTimer: Send + Sync {
    fn cancel(&self);
}

impl CancelTimer for AbortHandle {
    fn cancel(&self) {
        self.abort();
    }
}

/// Owned token for one scheduled timer.
///
/// Cancelling consumes the handle, so a timer can only be cancelled once.
/// Dropping a handle without cancelling leaves the timer armed.
pub struct TimerHandle {
    inner: Box<dyn CancelTimer>,
}

impl TimerHandle {
    pub fn new(inner: impl CancelTimer + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Cancels the timer. A timer that already fired is unaffected.
    pub fn cancel(self) {
        self.inner.cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle").finish_non_exhaustive()
    }
}

// == Tokio Scheduler ==
/// Scheduler backed by tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    /// Creates a scheduler bound to the given runtime.
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Creates a scheduler bound to the runtime of the calling context.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) -> TimerHandle {
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        TimerHandle::new(join.abort_handle())
    }

    fn defer(&self, task: Task) {
        self.runtime.spawn(async move { task() });
    }
}

// == Manual Scheduler ==
/// Virtual-clock scheduler. Nothing runs until [`ManualScheduler::advance`]
/// or [`ManualScheduler::run_pending`] is called.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    // Keyed by (deadline, id) so equal deadlines fire in scheduling order.
    timers: BTreeMap<(Duration, u64), Task>,
    deferred: VecDeque<Task>,
}

struct ManualTimer {
    slot: (Duration, u64),
    state: Weak<Mutex<ManualState>>,
}

impl CancelTimer for ManualTimer {
    fn cancel(&self) {
        if let Some(state) = self.state.upgrade() {
            state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .timers
                .remove(&self.slot);
        }
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current virtual time, measured from creation.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of armed timers that have neither fired nor been cancelled.
    pub fn pending_timers(&self) -> usize {
        self.lock().timers.len()
    }

    /// Number of deferred tasks waiting to run.
    pub fn pending_tasks(&self) -> usize {
        self.lock().deferred.len()
    }

    /// Runs every deferred task, including ones queued while draining.
    /// Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.lock().deferred.pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Moves the clock forward by `by`, firing due timers in deadline order.
    ///
    /// Deferred tasks run at the current instant before any timer fires, so
    /// work queued "now" is observed before the clock moves.
    pub fn advance(&self, by: Duration) {
        let target = self.lock().now + by;
        loop {
            self.run_pending();
            let due = {
                let mut state = self.lock();
                match state.timers.first_key_value() {
                    Some((&(deadline, _), _)) if deadline <= target => {
                        state.now = state.now.max(deadline);
                        state.timers.pop_first().map(|(_, task)| task)
                    }
                    _ => {
                        state.now = state.now.max(target);
                        None
                    }
                }
            };
            match due {
                Some(task) => task(),
                None => break,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) -> TimerHandle {
        let mut state = self.lock();
        let slot = (state.now + delay, state.next_id);
        state.next_id += 1;
        state.timers.insert(slot, task);
        TimerHandle::new(ManualTimer {
            slot,
            state: Arc::downgrade(&self.state),
        })
    }

    fn defer(&self, task: Task) {
        self.lock().deferred.push_back(task);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("timers", &state.timers.len())
            .field("deferred", &state.deferred.len())
            .finish()
    }
}
