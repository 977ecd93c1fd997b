use once_cell::sync::OnceCell;
use rayon::ThreadPoolBuilder;
use std::sync::Arc;

static THREAD_POOL: OnceCell<Arc<rayon::ThreadPool>> = OnceCell::new();

/// Upper bound on worker threads when none are configured.
const DEFAULT_MAX_THREADS: usize = 8;

/// Initialize the global digest pool with the specified number of threads
///
/// # Errors
///
/// Returns an error if the thread pool cannot be built or was already initialized
pub fn init_thread_pool(num_threads: usize) -> anyhow::Result<()> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("fm-digest-{i}"))
        .build()?;

    THREAD_POOL
        .set(Arc::new(pool))
        .map_err(|_| anyhow::anyhow!("Thread pool already initialized"))?;

    Ok(())
}

/// Get the global thread pool, initializing with default settings if needed
///
/// Falls back to rayon's global pool if a dedicated pool cannot be built.
fn get_thread_pool() -> Option<Arc<rayon::ThreadPool>> {
    THREAD_POOL
        .get_or_try_init(|| {
            ThreadPoolBuilder::new()
                .num_threads(default_threads())
                .thread_name(|i| format!("fm-digest-{i}"))
                .build()
                .map(Arc::new)
        })
        .ok()
        .cloned()
}

/// Run a function in the configured thread pool
pub fn run_in_pool<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match get_thread_pool() {
        Some(pool) => pool.install(f),
        None => f(),
    }
}

/// Configure the pool from the `[performance]` section.
///
/// A thread count of 0 keeps the lazily-built default pool.
///
/// # Errors
///
/// Returns an error if the thread pool has already been initialized
pub fn configure_from_config(config: &crate::config::Config) -> anyhow::Result<()> {
    if config.performance.parallel_threads > 0 {
        init_thread_pool(config.performance.parallel_threads)?;
    }
    Ok(())
}

/// Number of workers used when the configuration leaves it unset.
#[must_use]
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
        .min(DEFAULT_MAX_THREADS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threads_bounded() {
        let n = default_threads();
        assert!(n >= 1);
        assert!(n <= DEFAULT_MAX_THREADS);
    }

    #[test]
    fn test_run_in_pool_returns_value() {
        let sum: u32 = run_in_pool(|| (1..=10).sum());
        assert_eq!(sum, 55);
    }
}
