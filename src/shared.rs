//! Shared-memory multiplication on a fixed-size rayon pool.
//!
//! Rows are assigned to threads with the same planner the distributed
//! multiply uses, and each task writes only its own slice of the result.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::element::Element;
use crate::error::MultiplyError;
use crate::matrix::{check_inner_dimensions, Matrix};
use crate::partition::plan;

pub struct SharedMultiplier {
    pool: ThreadPool,
    threads: usize,
}

impl SharedMultiplier {
    pub fn new(threads: usize) -> Result<Self, MultiplyError> {
        if threads == 0 {
            return Err(MultiplyError::NoThreads);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("rowblock-{}", index))
            .build()?;
        Ok(SharedMultiplier { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn multiply<T: Element>(&self, a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, MultiplyError> {
        check_inner_dimensions(a, b)?;

        let cols = b.cols();
        let mut result = Matrix::new(a.rows(), cols);

        let mut rest = result.as_mut_slice();
        let mut blocks = Vec::with_capacity(self.threads);
        for range in plan(a.rows(), self.threads) {
            let (block, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * cols);
            rest = tail;
            if !range.is_empty() {
                blocks.push((range, block));
            }
        }

        self.pool.scope(|scope| {
            for (range, block) in blocks {
                scope.spawn(move |_| {
                    a.product_rows_into(b, range.rows(), block);
                    debug!(start = range.start, end = range.end, "computed row block");
                });
            }
        });

        Ok(result)
    }
}

/// One-shot convenience: build a pool of `threads` threads and multiply.
pub fn multiply<T: Element>(a: &Matrix<T>, b: &Matrix<T>, threads: usize) -> Result<Matrix<T>, MultiplyError> {
    SharedMultiplier::new(threads)?.multiply(a, b)
}
