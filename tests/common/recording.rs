use std::sync::atomic::{AtomicUsize, Ordering};

use rowblock_matmul::channel::{Channel, Tag};
use rowblock_matmul::{ChannelError, Element};

/// Wraps a channel and counts the traffic that goes through it
pub struct RecordingChannel<C> {
    inner: C,
    sends: AtomicUsize,
    receives: AtomicUsize,
    broadcasts: AtomicUsize,
}

impl<C> RecordingChannel<C> {
    pub fn new(inner: C) -> Self {
        RecordingChannel {
            inner,
            sends: AtomicUsize::new(0),
            receives: AtomicUsize::new(0),
            broadcasts: AtomicUsize::new(0),
        }
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn receives(&self) -> usize {
        self.receives.load(Ordering::SeqCst)
    }

    /// Every message-moving call, of any kind
    pub fn traffic(&self) -> usize {
        self.sends() + self.receives() + self.broadcasts.load(Ordering::SeqCst)
    }
}

impl<C: Channel> Channel for RecordingChannel<C> {
    fn rank(&self) -> usize {
        self.inner.rank()
    }

    fn world_size(&self) -> usize {
        self.inner.world_size()
    }

    fn broadcast<T: Element>(&self, buf: &mut [T], root: usize) -> Result<(), ChannelError> {
        self.broadcasts.fetch_add(1, Ordering::SeqCst);
        self.inner.broadcast(buf, root)
    }

    fn send<T: Element>(&self, buf: &[T], dest: usize, tag: Tag) -> Result<(), ChannelError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.inner.send(buf, dest, tag)
    }

    fn receive<T: Element>(&self, buf: &mut [T], source: usize, tag: Tag) -> Result<(), ChannelError> {
        self.receives.fetch_add(1, Ordering::SeqCst);
        self.inner.receive(buf, source, tag)
    }

    fn barrier(&self) -> Result<(), ChannelError> {
        self.inner.barrier()
    }

    fn wall_time(&self) -> f64 {
        self.inner.wall_time()
    }
}
