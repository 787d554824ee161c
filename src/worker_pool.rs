use crate::errors::{HistogramError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Worker count used when none is configured: the hardware concurrency.
pub fn default_thread_count() -> usize {
    num_cpus::get().max(1)
}

/// Builds the pool shared by the quantization and histogram phases.
pub fn build_pool(num_threads: usize) -> Result<Arc<ThreadPool>> {
    if num_threads == 0 {
        return Err(HistogramError::InvalidThreadCount {
            threads: num_threads,
        });
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("histogram-worker-{}", i))
        .build()
        .map_err(|e| HistogramError::ThreadPool {
            message: e.to_string(),
        })?;

    tracing::debug!(num_threads, "built worker pool");
    Ok(Arc::new(pool))
}
