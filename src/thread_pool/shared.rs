use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use log::{debug, error};

use super::builder::{PanicPolicy, TaskPanic};
use super::task::Task;
use crate::{PoolError, Result};

/// Queue and shutdown flag, guarded together by one mutex.
struct State {
    queue: VecDeque<Task>,
    shutdown: bool,
}

/// State shared between a pool handle and all of its workers.
///
/// Workers each hold an `Arc` to this, so it outlives the handle for as
/// long as any worker is still running.
pub(crate) struct Shared {
    state: Mutex<State>,
    cond: Condvar,
    /// Join handles, taken exactly once by whoever runs shutdown first.
    workers: Mutex<Vec<JoinHandle<()>>>,
    /// Worker thread ids, fixed once every worker has started.
    worker_ids: OnceLock<Vec<ThreadId>>,
    thread_count: usize,
    panic_policy: PanicPolicy,
    panics: AtomicUsize,
}

impl Shared {
    pub(crate) fn new(thread_count: usize, panic_policy: PanicPolicy) -> Self {
        Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                shutdown: false,
            }),
            cond: Condvar::new(),
            workers: Mutex::new(Vec::with_capacity(thread_count)),
            worker_ids: OnceLock::new(),
            thread_count,
            panic_policy,
            panics: AtomicUsize::new(0),
        }
    }

    // Tasks never run under either lock, so a poisoned guard still protects
    // a consistent queue.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub(crate) fn add_worker(&self, handle: JoinHandle<()>) {
        self.workers().push(handle);
    }

    /// Records the ids of all started workers. Called once, before the pool
    /// handle is handed out, so no task can observe an unsealed pool.
    pub(crate) fn seal_workers(&self) {
        let ids = self.workers().iter().map(|h| h.thread().id()).collect();
        let _ = self.worker_ids.set(ids);
    }

    fn on_worker_thread(&self) -> bool {
        let current = thread::current().id();
        self.worker_ids
            .get()
            .is_some_and(|ids| ids.contains(&current))
    }

    /// Appends a task to the tail of the queue and wakes one idle worker.
    ///
    /// Rejected once shutdown has begun: the flag is checked under the same
    /// lock shutdown sets it with, so every accepted task gets drained.
    pub(crate) fn push(&self, task: Task) -> Result<()> {
        {
            let mut state = self.state();
            if state.shutdown {
                return Err(PoolError::ShutDown);
            }
            state.queue.push_back(task);
        }
        self.cond.notify_one();
        Ok(())
    }

    /// Blocks until a task is available, or returns `None` once the queue
    /// is empty and shutdown has been requested.
    pub(crate) fn next_task(&self) -> Option<Task> {
        let mut state = self.state();
        loop {
            if let Some(task) = state.queue.pop_front() {
                return Some(task);
            }
            if state.shutdown {
                return None;
            }
            state = self
                .cond
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.state().queue.is_empty()
    }

    pub(crate) fn pending(&self) -> usize {
        self.state().queue.len()
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.state().shutdown
    }

    pub(crate) fn panic_count(&self) -> usize {
        self.panics.load(Ordering::Relaxed)
    }

    /// Sets the shutdown flag, wakes every worker, and joins them.
    ///
    /// Callers racing on this block on the join lock until the first caller
    /// has joined everything, then find nothing left to join. Called from a
    /// task on one of our own workers, it only requests shutdown: joining
    /// from there could wait on this very thread or on a worker blocked
    /// behind the join lock.
    pub(crate) fn shutdown(&self) {
        {
            let mut state = self.state();
            if !state.shutdown {
                debug!("Shutting down pool with {} queued tasks", state.queue.len());
                state.shutdown = true;
            }
        }
        self.cond.notify_all();

        if self.on_worker_thread() {
            debug!("Shutdown requested from a worker; leaving join to the owner");
            return;
        }

        let mut workers = self.workers();
        for handle in workers.drain(..) {
            let name = handle.thread().name().unwrap_or("<unnamed>").to_owned();
            if handle.join().is_err() {
                error!("Worker {name} terminated abnormally");
            }
        }
    }

    /// Routes a caught task panic to the configured policy.
    pub(crate) fn report_panic(&self, panic: TaskPanic) {
        self.panics.fetch_add(1, Ordering::Relaxed);
        match &self.panic_policy {
            PanicPolicy::Log => {
                error!(
                    "Task panicked on {} (worker {}): {}",
                    panic.thread_name, panic.worker, panic.message
                );
            }
            PanicPolicy::Abort => {
                error!(
                    "Task panicked on {} (worker {}): {}; aborting",
                    panic.thread_name, panic.worker, panic.message
                );
                std::process::abort();
            }
            PanicPolicy::Custom(handler) => {
                if catch_unwind(AssertUnwindSafe(|| handler(&panic))).is_err() {
                    error!(
                        "Panic handler panicked on {} (worker {})",
                        panic.thread_name, panic.worker
                    );
                }
            }
        }
    }
}
