use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::debug;

use super::builder::TaskPanic;
use super::shared::Shared;

/// Spawns worker `id`, which consumes tasks until the pool shuts down and
/// its queue is drained.
pub(crate) fn spawn_worker(
    id: usize,
    name: String,
    stack_size: Option<usize>,
    shared: Arc<Shared>,
) -> io::Result<JoinHandle<()>> {
    let mut builder = thread::Builder::new().name(name.clone());
    if let Some(size) = stack_size {
        builder = builder.stack_size(size);
    }

    builder.spawn(move || {
        debug!("Worker {id} started");
        while let Some(task) = shared.next_task() {
            // The queue lock is released here; other workers and submitters
            // proceed while this task runs.
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                shared.report_panic(TaskPanic {
                    worker: id,
                    thread_name: name.clone(),
                    message: panic_message(payload.as_ref()),
                });
            }
        }
        debug!("Worker {id}: queue drained, shutting down");
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_string_payloads() {
        let payload = panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");

        let payload = panic::catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 7");

        let payload = panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "Box<dyn Any>");
    }
}
