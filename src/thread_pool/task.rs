/// A stored, type-erased unit of work.
///
/// Tasks carry no identity and no return channel; whatever they produce
/// must be published through state they captured.
pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;

/// Boxes a zero-argument job.
pub(crate) fn boxed<F>(job: F) -> Task
where
    F: FnOnce() + Send + 'static,
{
    Box::new(job)
}

/// Binds `args` to `job`, producing a zero-argument task.
///
/// The arguments are moved into the task here and handed to `job` by value
/// exactly once, when a worker runs it.
pub(crate) fn bind<F, A>(job: F, args: A) -> Task
where
    F: FnOnce(A) + Send + 'static,
    A: Send + 'static,
{
    Box::new(move || job(args))
}
