use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::debug;

use super::shared::Shared;
use super::worker::spawn_worker;
use super::ThreadPool;
use crate::Result;

const DEFAULT_NAME: &str = "taskpool-worker";

/// Callback invoked with the details of a panicking task.
pub type PanicHandler = Arc<dyn Fn(&TaskPanic) + Send + Sync + 'static>;

/// Details of a task that panicked on a worker thread.
#[derive(Debug, Clone)]
pub struct TaskPanic {
    /// Index of the worker that ran the task.
    pub worker: usize,
    /// Name of the worker thread.
    pub thread_name: String,
    /// The panic payload rendered as text, when it was a string.
    pub message: String,
}

/// What a worker does after one of its tasks panics.
///
/// In every case except `Abort` the worker keeps running, so the pool never
/// loses threads to misbehaving tasks.
#[derive(Clone, Default)]
pub enum PanicPolicy {
    /// Log the panic at error level and continue.
    #[default]
    Log,
    /// Log the panic and abort the process.
    Abort,
    /// Hand the panic to a user callback and continue.
    Custom(PanicHandler),
}

impl PanicPolicy {
    /// Wraps a closure as a `Custom` policy.
    pub fn custom<H>(handler: H) -> Self
    where
        H: Fn(&TaskPanic) + Send + Sync + 'static,
    {
        PanicPolicy::Custom(Arc::new(handler))
    }
}

impl fmt::Debug for PanicPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanicPolicy::Log => f.write_str("Log"),
            PanicPolicy::Abort => f.write_str("Abort"),
            PanicPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Configures and starts a [`ThreadPool`].
///
/// ```
/// use taskpool::{Builder, PanicPolicy};
///
/// let pool = Builder::new()
///     .threads(2)
///     .name("io")
///     .panic_policy(PanicPolicy::Log)
///     .build()
///     .unwrap();
/// assert_eq!(pool.thread_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    threads: usize,
    name: String,
    stack_size: Option<usize>,
    panic_policy: PanicPolicy,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            threads: num_cpus::get(),
            name: DEFAULT_NAME.to_owned(),
            stack_size: None,
            panic_policy: PanicPolicy::default(),
        }
    }
}

impl Builder {
    /// Creates a builder sized to the number of logical CPUs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of worker threads. Zero is allowed; such a pool
    /// accepts tasks but never runs them.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the prefix of worker thread names (`"{prefix}-{index}"`).
    pub fn name(mut self, prefix: impl Into<String>) -> Self {
        self.name = prefix.into();
        self
    }

    /// Sets the stack size of each worker thread, in bytes.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Sets how panicking tasks are handled.
    pub fn panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.panic_policy = policy;
        self
    }

    /// Spawns the workers and returns the running pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`](crate::PoolError::Spawn) if a worker
    /// thread cannot be created. Workers already started are shut down and
    /// joined first.
    pub fn build(self) -> Result<ThreadPool> {
        let shared = Arc::new(Shared::new(self.threads, self.panic_policy));
        let (prefix, stack_size) = (self.name, self.stack_size);

        start_workers(&shared, self.threads, |id, shared| {
            spawn_worker(id, format!("{prefix}-{id}"), stack_size, shared)
        })?;

        debug!("Started pool with {} workers", self.threads);
        Ok(ThreadPool::from_shared(shared))
    }
}

/// Spawns `threads` workers with `spawn`. If one fails, the workers already
/// running are shut down and joined before the error is returned.
fn start_workers<S>(shared: &Arc<Shared>, threads: usize, mut spawn: S) -> Result<()>
where
    S: FnMut(usize, Arc<Shared>) -> io::Result<JoinHandle<()>>,
{
    for id in 0..threads {
        match spawn(id, Arc::clone(shared)) {
            Ok(handle) => shared.add_worker(handle),
            Err(e) => {
                shared.shutdown();
                return Err(e.into());
            }
        }
    }
    shared.seal_workers();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_cpu_count() {
        let builder = Builder::new();
        assert_eq!(builder.threads, num_cpus::get());
        assert_eq!(builder.name, DEFAULT_NAME);
        assert!(matches!(builder.panic_policy, PanicPolicy::Log));
    }

    #[test]
    fn worker_threads_are_named() {
        let pool = Builder::new().threads(1).name("named").build().unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        pool.submit(move || {
            let name = std::thread::current().name().map(str::to_owned);
            tx.send(name).unwrap();
        })
        .unwrap();
        assert_eq!(rx.recv().unwrap().as_deref(), Some("named-0"));
    }

    #[test]
    fn failed_spawn_joins_started_workers() {
        let shared = Arc::new(Shared::new(3, PanicPolicy::Log));
        let result = start_workers(&shared, 3, |id, shared| {
            if id == 2 {
                return Err(io::Error::other("out of threads"));
            }
            spawn_worker(id, format!("rollback-{id}"), None, shared)
        });

        assert!(matches!(result, Err(crate::PoolError::Spawn(_))));
        assert!(shared.is_shutdown());
        // Both started workers exited and released their handles.
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn custom_stack_size_runs_tasks() {
        let pool = Builder::new()
            .threads(2)
            .stack_size(256 * 1024)
            .build()
            .unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        pool.submit_with(move |n: u32| tx.send(n * 2).unwrap(), 21)
            .unwrap();
        assert_eq!(rx.recv().unwrap(), 42);
    }
}
