//! Periodic notification producers
//!
//! The event loop that fires periodic callbacks belongs to the embedding
//! program and is reached through the [`Timer`] trait. Two implementations
//! ship here: [`ThreadTimer`], which runs each task on its own thread, and
//! [`ManualTimer`], which fires only when advanced explicitly.
//!
//! [`start_producers`] attaches one task to every characteristic that
//! declares a notify interval. The task keeps running while nobody is
//! subscribed; the characteristic only gates emission. Its [`TimerHandle`] is
//! owned by the characteristic, so dropping the application stops it.

use crate::gatt::{Application, Characteristic};
use log::{debug, trace, warn};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread;
use std::time::Duration;

/// Callback fired once per period
pub type TimerCallback = Box<dyn FnMut() + Send + 'static>;

/// Fires callbacks periodically until their handle is cancelled.
///
/// A zero interval is refused: the returned handle is already cancelled and
/// the callback never runs.
pub trait Timer {
    fn schedule(&self, interval: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancels its task on [`TimerHandle::cancel`] or on drop
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    /// Dropping the sender wakes a sleeping worker thread
    wake: Option<mpsc::Sender<()>>,
}

impl TimerHandle {
    fn new(cancelled: Arc<AtomicBool>, wake: Option<mpsc::Sender<()>>) -> Self {
        Self { cancelled, wake }
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.wake.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn refused() -> Self {
        warn!("Refusing to schedule a task with a zero interval");
        Self::new(Arc::new(AtomicBool::new(true)), None)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Runs every task on a dedicated thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadTimer;

impl Timer for ThreadTimer {
    fn schedule(&self, interval: Duration, mut callback: TimerCallback) -> TimerHandle {
        if interval.is_zero() {
            return TimerHandle::refused();
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        let (wake_tx, wake_rx) = mpsc::channel::<()>();
        let flag = cancelled.clone();

        thread::spawn(move || loop {
            match wake_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if flag.load(Ordering::SeqCst) {
                        break;
                    }
                    callback();
                }
                // Woken or disconnected: the handle was cancelled
                _ => break,
            }
        });

        TimerHandle::new(cancelled, Some(wake_tx))
    }
}

struct ManualTask {
    id: u64,
    interval: Duration,
    next_due: Duration,
    cancelled: Arc<AtomicBool>,
    /// Taken out while the callback runs
    callback: Option<TimerCallback>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    tasks: Vec<ManualTask>,
}

/// Deterministic timer driven by [`ManualTimer::advance`].
///
/// Callbacks run on the thread calling `advance`, with no internal lock held.
#[derive(Default)]
pub struct ManualTimer {
    state: Mutex<ManualState>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since creation
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of live (uncancelled) tasks
    pub fn active_tasks(&self) -> usize {
        let mut state = self.lock();
        state.tasks.retain(|t| !t.cancelled.load(Ordering::SeqCst));
        state.tasks.len()
    }

    /// Move time forward by `by`, firing every period that elapses in due
    /// order. Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut fired = 0;

        loop {
            let (id, due, mut callback) = {
                let mut state = self.lock();
                state.tasks.retain(|t| !t.cancelled.load(Ordering::SeqCst));
                let next = state
                    .tasks
                    .iter_mut()
                    .filter(|t| t.next_due <= target && t.callback.is_some())
                    .min_by_key(|t| (t.next_due, t.id));
                let Some(task) = next else {
                    state.now = target;
                    return fired;
                };
                let due = task.next_due;
                task.next_due += task.interval;
                let (id, callback) = match task.callback.take() {
                    Some(callback) => (task.id, callback),
                    None => continue,
                };
                state.now = due;
                (id, due, callback)
            };

            trace!("ManualTimer firing task {} at {:?}", id, due);
            callback();
            fired += 1;

            let mut state = self.lock();
            if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
                task.callback = Some(callback);
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, interval: Duration, callback: TimerCallback) -> TimerHandle {
        if interval.is_zero() {
            return TimerHandle::refused();
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut state = self.lock();
        let next_due = state.now + interval;
        let id = state.next_id;
        state.next_id += 1;
        state.tasks.push(ManualTask {
            id,
            interval,
            next_due,
            cancelled: cancelled.clone(),
            callback: Some(callback),
        });
        TimerHandle::new(cancelled, None)
    }
}

impl fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualTimer")
            .field("now", &state.now)
            .field("tasks", &state.tasks.len())
            .finish()
    }
}

/// Attach a producer to every characteristic with a nonzero notify
/// interval.
///
/// Returns how many producers were started.
pub fn start_producers(app: &Application, timer: &dyn Timer) -> usize {
    let mut started = 0;
    for chrc in app.characteristics() {
        let Some(interval) = chrc.notify_interval() else {
            continue;
        };
        if interval.is_zero() {
            warn!("{}: zero notify interval, no producer started", chrc.path());
            continue;
        }
        let weak: Weak<Characteristic> = Arc::downgrade(chrc);
        let handle = timer.schedule(
            interval,
            Box::new(move || {
                if let Some(chrc) = weak.upgrade() {
                    chrc.tick();
                }
            }),
        );
        chrc.set_producer(handle);
        debug!("Producer started for {} every {:?}", chrc.path(), interval);
        started += 1;
    }
    started
}
