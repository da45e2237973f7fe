#![deny(missing_docs)]

//! A fixed-size worker thread pool for fire-and-forget tasks.
//!
//! Tasks are queued in FIFO order on a single shared queue and executed
//! by a fixed set of background threads. Shutting the pool down, or
//! dropping it, drains the queue and joins every worker.

mod error;
/// The thread pool, its builder, and panic handling policies.
pub mod thread_pool;

pub use error::{PoolError, Result};
pub use thread_pool::{Builder, PanicHandler, PanicPolicy, TaskPanic, ThreadPool};
