use std::sync::Arc;

use crate::{PoolError, Result};

mod builder;
mod shared;
mod task;
mod worker;

pub use self::builder::{Builder, PanicHandler, PanicPolicy, TaskPanic};
use self::shared::Shared;

/// A fixed-size pool of worker threads fed from one FIFO queue.
///
/// Jobs are fire-and-forget: the pool reports nothing back about them.
/// [`shutdown`](ThreadPool::shutdown), or dropping the pool, waits for
/// every queued job to run and joins all workers.
///
/// A pool obtained from [`Default`] has no workers and no queue; every
/// operation on it other than shutdown fails with
/// [`PoolError::InvalidState`].
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use taskpool::ThreadPool;
///
/// let pool = ThreadPool::new(4).unwrap();
/// let counter = Arc::new(AtomicUsize::new(0));
/// for _ in 0..100 {
///     let counter = Arc::clone(&counter);
///     pool.submit(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     })
///     .unwrap();
/// }
/// pool.shutdown();
/// assert_eq!(counter.load(Ordering::SeqCst), 100);
/// ```
#[derive(Default)]
pub struct ThreadPool {
    shared: Option<Arc<Shared>>,
}

impl ThreadPool {
    /// Creates a pool with `threads` workers and default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned.
    pub fn new(threads: usize) -> Result<Self> {
        Builder::new().threads(threads).build()
    }

    /// Returns a [`Builder`] for a customized pool.
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        ThreadPool {
            shared: Some(shared),
        }
    }

    fn shared(&self) -> Result<&Shared> {
        self.shared.as_deref().ok_or(PoolError::InvalidState)
    }

    /// Queues `job` to run on one of the workers.
    ///
    /// Never blocks waiting for capacity.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidState`] for a default pool and
    /// [`PoolError::ShutDown`] once shutdown has begun.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared()?.push(task::boxed(job))
    }

    /// Queues `job` to be called with `args`.
    ///
    /// `args` is moved into the queued task now and passed to `job` when it
    /// runs; use a tuple for several arguments.
    ///
    /// ```
    /// # use taskpool::ThreadPool;
    /// # use std::sync::mpsc;
    /// let pool = ThreadPool::new(1).unwrap();
    /// let (tx, rx) = mpsc::channel();
    /// pool.submit_with(|(a, b, tx): (u32, u32, mpsc::Sender<u32>)| tx.send(a + b).unwrap(), (2, 3, tx))
    ///     .unwrap();
    /// assert_eq!(rx.recv().unwrap(), 5);
    /// ```
    pub fn submit_with<F, A>(&self, job: F, args: A) -> Result<()>
    where
        F: FnOnce(A) + Send + 'static,
        A: Send + 'static,
    {
        self.shared()?.push(task::bind(job, args))
    }

    /// Whether the queue looks empty right now.
    ///
    /// Jobs already taken by a worker are not counted, and the answer can be
    /// stale by the time it is returned. Use it for diagnostics only.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.shared()?.is_empty())
    }

    /// Number of jobs waiting in the queue; the same caveats as
    /// [`is_empty`](ThreadPool::is_empty) apply.
    pub fn pending(&self) -> Result<usize> {
        Ok(self.shared()?.pending())
    }

    /// Whether this pool has workers and a queue.
    pub fn is_initialized(&self) -> bool {
        self.shared.is_some()
    }

    /// Whether shutdown has begun. A default pool reports `false`.
    pub fn is_shutdown(&self) -> bool {
        self.shared.as_ref().is_some_and(|s| s.is_shutdown())
    }

    /// Number of worker threads the pool was started with.
    pub fn thread_count(&self) -> usize {
        self.shared.as_ref().map_or(0, |s| s.thread_count())
    }

    /// Number of jobs that have panicked so far.
    pub fn panic_count(&self) -> usize {
        self.shared.as_ref().map_or(0, |s| s.panic_count())
    }

    /// Stops accepting jobs, runs everything already queued, and joins
    /// every worker.
    ///
    /// Safe to call more than once and from several threads; later calls
    /// return once the workers have been joined. A pool with zero workers
    /// returns immediately and its queued jobs never run.
    ///
    /// Called from a job running on this pool, it stops the pool from taking
    /// new jobs and returns without joining; a shutdown from outside the pool
    /// (or dropping it) still waits for that job and every other worker.
    pub fn shutdown(&self) {
        if let Some(shared) = &self.shared {
            shared.shutdown();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
