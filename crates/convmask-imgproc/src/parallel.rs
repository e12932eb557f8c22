use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row stride must be valid.
    #[error("row stride must be > 0, got {0}")]
    InvalidRowStride(usize),
}

/// Controls how row-wise operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    AutoRows,

    /// Run sequentially on the current thread, top row first.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call.
    Fixed(usize),
}

impl std::fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStrategy::AutoRows => write!(f, "auto-rows"),
            ExecutionStrategy::Serial => write!(f, "serial"),
            ExecutionStrategy::Fixed(n) => write!(f, "fixed({n})"),
        }
    }
}

/// Apply a fallible function to every row of a mutable buffer.
///
/// The buffer is split into disjoint rows of `row_stride` elements, so each
/// element is handed to exactly one invocation of `f`.
///
/// # Arguments
///
/// * `dst` - The destination buffer.
/// * `row_stride` - The number of elements in one row (width * channels).
/// * `strategy` - The execution strategy.
/// * `f` - The operation receiving the row index and the row slice.
///
/// # Errors
///
/// Returns the first error produced by `f`, or a [`ParallelError`] converted
/// into `E` when the strategy is misconfigured.
pub fn par_rows_mut<T, E, F>(
    dst: &mut [T],
    row_stride: usize,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), E>
where
    T: Send,
    E: From<ParallelError> + Send,
    F: Fn(usize, &mut [T]) -> Result<(), E> + Sync + Send,
{
    if row_stride == 0 {
        return Err(ParallelError::InvalidRowStride(row_stride).into());
    }

    match strategy {
        ExecutionStrategy::Serial => dst
            .chunks_mut(row_stride)
            .enumerate()
            .try_for_each(|(r, row)| f(r, row)),
        ExecutionStrategy::AutoRows => dst
            .par_chunks_mut(row_stride)
            .enumerate()
            .try_for_each(|(r, row)| f(r, row)),
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n).into());
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                dst.par_chunks_mut(row_stride)
                    .enumerate()
                    .try_for_each(|(r, row)| f(r, row))
            })
        }
    }
}
