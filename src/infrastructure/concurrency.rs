/// Concurrency management for rectrace.
/// Sizes the thread pool used when several targets are traced at once.

use anyhow::Result;

/// Worker count when none is requested: half the cores, minimum 1.
pub fn default_workers() -> usize {
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Initialize the global rayon thread pool. Each worker runs whole,
/// independent pipeline invocations; nothing is shared between them.
pub fn init_thread_pool(jobs: Option<usize>) -> Result<usize> {
    let workers = jobs.filter(|&n| n > 0).unwrap_or_else(default_workers);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    tracing::debug!(workers, cores = num_cpus::get(), "[rectrace] initialized thread pool");

    Ok(workers)
}
