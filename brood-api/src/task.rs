/// A single piece of work executed once by a pool worker.
///
/// Implementations must handle their own failures and encode them in
/// `Output`; a panic is caught by the worker and surfaces to the waiter as
/// [`WaitError::Internal`](crate::errors::WaitError::Internal).
///
/// Any `FnOnce() -> T` closure that is `Send + 'static` is a unit of work.
pub trait UnitOfWork: Send + 'static {
    /// Value reported back to the submitter
    type Output: Send + 'static;

    /// Run the work on the current worker thread.
    fn run(self) -> Self::Output;
}

impl<F, T> UnitOfWork for F
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn run(self) -> T {
        self()
    }
}
