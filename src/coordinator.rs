use tracing::debug;

use crate::channel::{Channel, Tag};
use crate::element::Element;
use crate::error::MultiplyError;
use crate::matrix::Matrix;
use crate::partition::row_range;

/// Rank that assembles and returns the full result.
pub const COORDINATOR: usize = 0;

/// The gathering side of a distributed multiply.
pub struct Coordinator<'c, C> {
    channel: &'c C,
}

impl<'c, C: Channel> Coordinator<'c, C> {
    pub fn new(channel: &'c C) -> Self {
        Coordinator { channel }
    }

    /// Assemble the `total_rows x cols` result from the coordinator's own
    /// block and one block per other active worker.
    ///
    /// Sender ranges are recomputed with the partition planner rather than
    /// received. Sources are drained in ascending rank order; workers with
    /// an empty range are skipped.
    pub fn gather<T: Element>(
        &self,
        own_block: &[T],
        total_rows: usize,
        cols: usize,
        active_workers: usize,
        tag: Tag,
    ) -> Result<Matrix<T>, MultiplyError> {
        let mut result = Matrix::new(total_rows, cols);

        let own = row_range(total_rows, active_workers, COORDINATOR);
        result.write_row_block(own.start, own_block)?;

        let mut scratch = Vec::new();
        for src in (COORDINATOR + 1)..active_workers {
            let range = row_range(total_rows, active_workers, src);
            if range.is_empty() {
                continue;
            }

            scratch.clear();
            scratch.resize(range.len() * cols, T::zero());
            self.channel.receive(&mut scratch, src, tag)?;
            result.write_row_block(range.start, &scratch)?;

            debug!(
                src,
                start = range.start,
                end = range.end,
                "received row block"
            );
        }

        Ok(result)
    }
}
