//! Global tokio runtime used by network transports.
//!
//! Loaders never require the caller to be inside a runtime. Network requests
//! are spawned here and their callbacks are funneled back to the loader's
//! task queue.

use std::sync::OnceLock;

use tokio::runtime::Runtime;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Initialize the runtime.
///
/// Calling this early is optional; the runtime is created on first use
/// otherwise.
///
/// # Panics
///
/// Panics if the operating system refuses to create the worker threads.
pub fn init() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        tracing::debug!(target: "horizon_fetch::transport", "starting network runtime");
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("horizon-fetch")
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime")
    })
}

/// Get a reference to the runtime, creating it if needed.
pub fn get() -> &'static Runtime {
    init()
}

/// Block on a future using the global runtime.
///
/// # Warning
///
/// Do not call this from within an async context, as it will panic.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    get().block_on(future)
}

/// Spawn a future on the global runtime.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    get().spawn(future)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let a = init() as *const Runtime;
        let b = get() as *const Runtime;
        assert_eq!(a, b);
    }

    #[test]
    fn test_spawn_and_block_on() {
        let handle = spawn(async { 21 * 2 });
        assert_eq!(block_on(handle).unwrap(), 42);
    }
}
