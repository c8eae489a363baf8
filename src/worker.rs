use tracing::debug;

use crate::channel::{Channel, Tag};
use crate::coordinator::COORDINATOR;
use crate::element::Element;
use crate::error::ChannelError;
use crate::matrix::Matrix;
use crate::partition::RowRange;

/// The computing side of one rank in a distributed multiply.
pub struct Worker<'c, C> {
    rank: usize,
    channel: &'c C,
}

impl<'c, C: Channel> Worker<'c, C> {
    pub fn new(channel: &'c C) -> Self {
        Worker {
            rank: channel.rank(),
            channel,
        }
    }

    /// Rows `range` of `a * b`, serialized row-major. Empty for an empty
    /// range.
    pub fn compute_block<T: Element>(&self, a: &Matrix<T>, b: &Matrix<T>, range: RowRange) -> Vec<T> {
        let mut block = vec![T::zero(); range.len() * b.cols()];
        a.product_rows_into(b, range.rows(), &mut block);
        debug!(
            rank = self.rank,
            start = range.start,
            end = range.end,
            cols = b.cols(),
            "computed row block"
        );
        block
    }

    /// Ship a computed block to the coordinator. Empty blocks are not sent;
    /// the coordinator knows not to expect them.
    pub fn send_block<T: Element>(&self, block: &[T], tag: Tag) -> Result<(), ChannelError> {
        if block.is_empty() {
            debug!(rank = self.rank, "no rows assigned, nothing to send");
            return Ok(());
        }
        self.channel.send(block, COORDINATOR, tag)?;
        debug!(rank = self.rank, len = block.len(), tag, "sent row block to coordinator");
        Ok(())
    }
}
