use rowblock_matmul::channel::{Channel, Tag};
use rowblock_matmul::coordinator::COORDINATOR;
use rowblock_matmul::{ChannelError, Element};

/// Wraps a channel and cuts the link between the coordinator and `peer`:
/// the coordinator cannot receive from it and it cannot send to the
/// coordinator. Everything else passes through.
pub struct SeveredChannel<C> {
    inner: C,
    peer: usize,
}

impl<C> SeveredChannel<C> {
    pub fn new(inner: C, peer: usize) -> Self {
        SeveredChannel { inner, peer }
    }
}

impl<C: Channel> Channel for SeveredChannel<C> {
    fn rank(&self) -> usize {
        self.inner.rank()
    }

    fn world_size(&self) -> usize {
        self.inner.world_size()
    }

    fn broadcast<T: Element>(&self, buf: &mut [T], root: usize) -> Result<(), ChannelError> {
        self.inner.broadcast(buf, root)
    }

    fn send<T: Element>(&self, buf: &[T], dest: usize, tag: Tag) -> Result<(), ChannelError> {
        if self.rank() == self.peer && dest == COORDINATOR {
            return Err(ChannelError::Disconnected(dest));
        }
        self.inner.send(buf, dest, tag)
    }

    fn receive<T: Element>(&self, buf: &mut [T], source: usize, tag: Tag) -> Result<(), ChannelError> {
        if self.rank() == COORDINATOR && source == self.peer {
            return Err(ChannelError::Disconnected(source));
        }
        self.inner.receive(buf, source, tag)
    }

    fn barrier(&self) -> Result<(), ChannelError> {
        self.inner.barrier()
    }

    fn wall_time(&self) -> f64 {
        self.inner.wall_time()
    }
}
