//! Threaded in-process world: every rank is a thread, messages go through
//! shared mailboxes.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Barrier, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Instant;

use tracing::trace;

use super::{Channel, Tag};
use crate::element::Element;
use crate::error::ChannelError;

/// Tags below zero are reserved for collectives.
const BROADCAST_TAG: Tag = -1;

type Message = Box<dyn Any + Send>;
type Mailboxes = HashMap<(usize, usize, Tag), VecDeque<Message>>;

struct Shared {
    size: usize,
    mailboxes: Mutex<Mailboxes>,
    delivered: Condvar,
    barrier: Barrier,
    epoch: Instant,
}

/// Factory for a set of connected [`LocalChannel`]s.
pub struct LocalWorld;

impl LocalWorld {
    /// One channel per rank, in rank order.
    pub fn channels(size: usize) -> Vec<LocalChannel> {
        let shared = Arc::new(Shared {
            size,
            mailboxes: Mutex::new(HashMap::new()),
            delivered: Condvar::new(),
            barrier: Barrier::new(size),
            epoch: Instant::now(),
        });

        (0..size)
            .map(|rank| LocalChannel {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    /// Run `body` on `size` threads, one per rank, and return the results in
    /// rank order. A panicking rank panics the caller.
    pub fn run<R, F>(size: usize, body: F) -> Vec<R>
    where
        F: Fn(LocalChannel) -> R + Sync,
        R: Send,
    {
        let body = &body;
        thread::scope(|scope| {
            let handles: Vec<_> = LocalWorld::channels(size)
                .into_iter()
                .map(|channel| scope.spawn(move || body(channel)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }
}

/// One rank's endpoint into a [`LocalWorld`].
pub struct LocalChannel {
    rank: usize,
    shared: Arc<Shared>,
}

impl LocalChannel {
    fn check_rank(&self, rank: usize) -> Result<(), ChannelError> {
        if rank >= self.shared.size {
            return Err(ChannelError::InvalidRank {
                rank,
                size: self.shared.size,
            });
        }
        Ok(())
    }

    fn mailboxes(&self, peer: usize) -> Result<MutexGuard<'_, Mailboxes>, ChannelError> {
        self.shared
            .mailboxes
            .lock()
            .map_err(|_| ChannelError::Disconnected(peer))
    }

    fn post<T: Element>(&self, buf: &[T], dest: usize, tag: Tag) -> Result<(), ChannelError> {
        self.check_rank(dest)?;
        trace!(rank = self.rank, dest, tag, len = buf.len(), "post");

        let mut mailboxes = self.mailboxes(dest)?;
        mailboxes
            .entry((self.rank, dest, tag))
            .or_default()
            .push_back(Box::new(buf.to_vec()));
        drop(mailboxes);

        self.shared.delivered.notify_all();
        Ok(())
    }

    fn take<T: Element>(&self, buf: &mut [T], source: usize, tag: Tag) -> Result<(), ChannelError> {
        self.check_rank(source)?;

        let key = (source, self.rank, tag);
        let mut mailboxes = self.mailboxes(source)?;
        let message = loop {
            if let Some(message) = mailboxes.get_mut(&key).and_then(VecDeque::pop_front) {
                break message;
            }
            mailboxes = self
                .shared
                .delivered
                .wait(mailboxes)
                .map_err(|_| ChannelError::Disconnected(source))?;
        };
        drop(mailboxes);

        let data = message
            .downcast::<Vec<T>>()
            .map_err(|_| ChannelError::TypeMismatch)?;
        if data.len() != buf.len() {
            return Err(ChannelError::CountMismatch {
                expected: buf.len(),
                actual: data.len(),
            });
        }
        buf.copy_from_slice(&data);
        trace!(rank = self.rank, source, tag, len = buf.len(), "take");
        Ok(())
    }
}

impl Channel for LocalChannel {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.shared.size
    }

    fn broadcast<T: Element>(&self, buf: &mut [T], root: usize) -> Result<(), ChannelError> {
        self.check_rank(root)?;
        if self.rank == root {
            for dest in (0..self.shared.size).filter(|&dest| dest != root) {
                self.post(buf, dest, BROADCAST_TAG)?;
            }
            Ok(())
        } else {
            self.take(buf, root, BROADCAST_TAG)
        }
    }

    fn send<T: Element>(&self, buf: &[T], dest: usize, tag: Tag) -> Result<(), ChannelError> {
        self.post(buf, dest, tag)
    }

    fn receive<T: Element>(&self, buf: &mut [T], source: usize, tag: Tag) -> Result<(), ChannelError> {
        self.take(buf, source, tag)
    }

    fn barrier(&self) -> Result<(), ChannelError> {
        self.shared.barrier.wait();
        Ok(())
    }

    fn wall_time(&self) -> f64 {
        self.shared.epoch.elapsed().as_secs_f64()
    }
}
