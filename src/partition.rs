//! Row-block partitioning shared by the distributed and shared-memory
//! multiplies.
//!
//! Every worker derives its own range, and the coordinator derives every
//! sender's range, from the same pure function. No partition metadata is
//! ever exchanged.

use std::ops::Range;

/// Half-open range of rows `[start, end)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Rows of a `total_rows` matrix assigned to `worker_index` out of
/// `worker_count` workers.
///
/// The first `total_rows % worker_count` workers get one extra row, so any
/// two ranges differ in length by at most one. Workers past `total_rows`
/// get an empty range.
pub fn row_range(total_rows: usize, worker_count: usize, worker_index: usize) -> RowRange {
    debug_assert!(worker_count >= 1, "worker_count must be at least 1");
    debug_assert!(
        worker_index < worker_count,
        "worker_index {} out of range for {} workers",
        worker_index,
        worker_count
    );

    let base = total_rows / worker_count;
    let remainder = total_rows % worker_count;

    let start = worker_index * base + worker_index.min(remainder);
    let len = base + usize::from(worker_index < remainder);

    RowRange {
        start,
        end: start + len,
    }
}

/// Ranges for every worker, in worker order.
pub fn plan(total_rows: usize, worker_count: usize) -> Vec<RowRange> {
    (0..worker_count)
        .map(|index| row_range(total_rows, worker_count, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: [usize; 5] = [0, 1, 7, 100, 2000];
    const WORKERS: [usize; 5] = [1, 2, 3, 5, 16];

    #[test]
    fn ranges_cover_all_rows_without_overlap() {
        for &total in &ROWS {
            for &workers in &WORKERS {
                let ranges = plan(total, workers);
                let mut next = 0;
                for range in &ranges {
                    assert_eq!(range.start, next, "gap or overlap for {total} rows / {workers} workers");
                    assert!(range.end >= range.start);
                    next = range.end;
                }
                assert_eq!(next, total);
            }
        }
    }

    #[test]
    fn ranges_are_balanced() {
        for total in 0..64 {
            for workers in 1..20 {
                let lens: Vec<usize> = plan(total, workers).iter().map(RowRange::len).collect();
                let max = *lens.iter().max().unwrap();
                let min = *lens.iter().min().unwrap();
                assert!(max - min <= 1, "{total} rows / {workers} workers: {lens:?}");
            }
        }
    }

    #[test]
    fn remainder_goes_to_lowest_indices() {
        assert_eq!(
            plan(7, 3),
            vec![
                RowRange { start: 0, end: 3 },
                RowRange { start: 3, end: 5 },
                RowRange { start: 5, end: 7 },
            ]
        );
    }

    #[test]
    fn more_workers_than_rows() {
        let ranges = plan(2, 5);
        assert_eq!(ranges[0], RowRange { start: 0, end: 1 });
        assert_eq!(ranges[1], RowRange { start: 1, end: 2 });
        for range in &ranges[2..] {
            assert!(range.is_empty());
            assert_eq!(range.start, 2);
        }
    }

    #[test]
    fn single_worker_owns_everything() {
        assert_eq!(row_range(100, 1, 0), RowRange { start: 0, end: 100 });
        assert_eq!(row_range(100, 1, 0).rows(), 0..100);
    }
}
