use mpi::topology::{Rank, SimpleCommunicator};
use mpi::traits::*;

use super::{Channel, Tag};
use crate::element::Element;
use crate::error::ChannelError;

/// [`Channel`] over an MPI communicator, one rank per process.
///
/// MPI aborts the job on transport errors, so the only failures reported
/// here are invalid ranks and short messages.
pub struct MpiChannel {
    world: SimpleCommunicator,
    rank: usize,
    size: usize,
}

impl MpiChannel {
    pub fn new(world: SimpleCommunicator) -> Self {
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        MpiChannel { world, rank, size }
    }

    fn peer(&self, rank: usize) -> Result<Rank, ChannelError> {
        if rank >= self.size {
            return Err(ChannelError::InvalidRank {
                rank,
                size: self.size,
            });
        }
        Ok(rank as Rank)
    }
}

impl Channel for MpiChannel {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.size
    }

    fn broadcast<T: Element>(&self, buf: &mut [T], root: usize) -> Result<(), ChannelError> {
        let root = self.peer(root)?;
        self.world.process_at_rank(root).broadcast_into(buf);
        Ok(())
    }

    fn send<T: Element>(&self, buf: &[T], dest: usize, tag: Tag) -> Result<(), ChannelError> {
        let dest = self.peer(dest)?;
        self.world.process_at_rank(dest).send_with_tag(buf, tag);
        Ok(())
    }

    fn receive<T: Element>(&self, buf: &mut [T], source: usize, tag: Tag) -> Result<(), ChannelError> {
        let source = self.peer(source)?;
        let status = self
            .world
            .process_at_rank(source)
            .receive_into_with_tag(buf, tag);

        let actual = status.count(T::equivalent_datatype()) as usize;
        if actual != buf.len() {
            return Err(ChannelError::CountMismatch {
                expected: buf.len(),
                actual,
            });
        }
        Ok(())
    }

    fn barrier(&self) -> Result<(), ChannelError> {
        self.world.barrier();
        Ok(())
    }

    fn wall_time(&self) -> f64 {
        mpi::time()
    }
}
