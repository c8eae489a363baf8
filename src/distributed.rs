//! Row-block distributed multiplication.
//!
//! Every rank calls [`DistributedMultiplier::multiply`] with its own full
//! copies of `A` and `B`. Ranks below `active_workers` each compute a
//! contiguous block of result rows; the coordinator gathers them.

use tracing::{debug, info_span};

use crate::channel::{Channel, Tag};
use crate::coordinator::{Coordinator, COORDINATOR};
use crate::element::Element;
use crate::error::MultiplyError;
use crate::matrix::{check_inner_dimensions, Matrix};
use crate::partition::row_range;
use crate::worker::Worker;

const FIRST_GATHER_TAG: Tag = 16;
const GATHER_TAG_SPAN: u32 = 16_384;

pub struct DistributedMultiplier<C> {
    channel: C,
    calls: u32,
}

impl<C: Channel> DistributedMultiplier<C> {
    pub fn new(channel: C) -> Self {
        DistributedMultiplier { channel, calls: 0 }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Compute `a * b` across the first `active_workers` ranks.
    ///
    /// Returns `Some(result)` on the coordinator and `None` everywhere else,
    /// including on ranks outside the active set, which return immediately.
    ///
    /// Both validation failures are reached before any message is sent, and
    /// every rank reaches the same verdict from its own copies of the
    /// inputs.
    pub fn multiply<T: Element>(
        &mut self,
        a: &Matrix<T>,
        b: &Matrix<T>,
        active_workers: usize,
    ) -> Result<Option<Matrix<T>>, MultiplyError> {
        // Advanced on every call and every rank so tags stay in step.
        let tag = self.next_tag();

        let rank = self.channel.rank();
        let world_size = self.channel.world_size();
        if active_workers == 0 || active_workers > world_size {
            return Err(MultiplyError::Configuration {
                active: active_workers,
                world_size,
            });
        }
        check_inner_dimensions(a, b)?;

        let _span = info_span!("multiply", rank, workers = active_workers, tag).entered();
        if rank >= active_workers {
            debug!("rank not active for this call");
            return Ok(None);
        }

        let range = row_range(a.rows(), active_workers, rank);
        let worker = Worker::new(&self.channel);
        let block = worker.compute_block(a, b, range);

        if rank == COORDINATOR {
            let result = Coordinator::new(&self.channel).gather(
                &block,
                a.rows(),
                b.cols(),
                active_workers,
                tag,
            )?;
            Ok(Some(result))
        } else {
            worker.send_block(&block, tag)?;
            Ok(None)
        }
    }

    fn next_tag(&mut self) -> Tag {
        let tag = FIRST_GATHER_TAG + (self.calls % GATHER_TAG_SPAN) as Tag;
        self.calls = self.calls.wrapping_add(1);
        tag
    }
}
