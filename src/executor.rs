//! Row-parallel execution for the separable passes.
//!
//! Pixel algorithms never spawn threads themselves. They hand their output
//! rows to a [`ParallelExecutor`], which decides whether the rows run in
//! order on the calling thread ([`Sequential`]) or fan out over rayon
//! workers ([`RayonExecutor`]). Rows are disjoint `&mut` chunks, so every
//! executor produces the same bytes.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{EffectsError, Result};

/// Runs a per-row closure over a flat, row-major buffer.
pub trait ParallelExecutor: Sync {
    /// Call `f(row_index, row)` for every `row_len`-sized chunk of `data`.
    ///
    /// Every row is visited exactly once before this returns.
    fn for_each_row<T, F>(&self, data: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send;
}

impl<X: ParallelExecutor> ParallelExecutor for &X {
    fn for_each_row<T, F>(&self, data: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        (**self).for_each_row(data, row_len, f)
    }
}

/// Runs rows in order on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl ParallelExecutor for Sequential {
    fn for_each_row<T, F>(&self, data: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if row_len == 0 {
            return;
        }
        for (y, row) in data.chunks_mut(row_len).enumerate() {
            f(y, row);
        }
    }
}

/// Spreads rows over rayon workers.
///
/// `global()` shares rayon's process-wide pool; `with_threads(n)` owns a
/// dedicated pool capped at `n` workers.
#[derive(Debug, Default)]
pub struct RayonExecutor {
    pool: Option<ThreadPool>,
}

impl RayonExecutor {
    pub fn global() -> Self {
        Self { pool: None }
    }

    pub fn with_threads(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(EffectsError::InvalidConfiguration(
                "worker count must be greater than zero".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("layerfx-worker-{}", i))
            .build()
            .map_err(|e| EffectsError::ThreadPool(e.to_string()))?;

        log::debug!("started dedicated pool with {} workers", threads);
        Ok(Self { pool: Some(pool) })
    }

    /// Number of workers rows may be spread over.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl ParallelExecutor for RayonExecutor {
    fn for_each_row<T, F>(&self, data: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if row_len == 0 {
            return;
        }

        match &self.pool {
            Some(pool) => pool.install(|| {
                data.par_chunks_mut(row_len)
                    .enumerate()
                    .for_each(|(y, row)| f(y, row))
            }),
            None => data
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| f(y, row)),
        }
    }
}
