//! Collective communication between workers.
//!
//! [`Channel`] is the only thing the multiply engine knows about its
//! transport. [`local::LocalWorld`] runs every rank as a thread of the
//! current process; `mpi_channel::MpiChannel` (feature `mpi`) runs one rank per
//! MPI process.

use crate::element::Element;
use crate::error::ChannelError;
use crate::matrix::Matrix;

pub mod local;
#[cfg(feature = "mpi")]
pub mod mpi_channel;

pub use local::{LocalChannel, LocalWorld};
#[cfg(feature = "mpi")]
pub use mpi_channel::MpiChannel;

/// Message tag, in the range MPI guarantees (`0..=32767`).
pub type Tag = i32;

pub trait Channel {
    fn rank(&self) -> usize;

    fn world_size(&self) -> usize;

    /// Replicate `buf` from `root` to every rank. Non-root ranks must pass a
    /// buffer of the same length as the root's.
    fn broadcast<T: Element>(&self, buf: &mut [T], root: usize) -> Result<(), ChannelError>;

    fn send<T: Element>(&self, buf: &[T], dest: usize, tag: Tag) -> Result<(), ChannelError>;

    /// Blocks until a message from `source` with `tag` arrives. The message
    /// must contain exactly `buf.len()` elements.
    fn receive<T: Element>(&self, buf: &mut [T], source: usize, tag: Tag)
        -> Result<(), ChannelError>;

    fn barrier(&self) -> Result<(), ChannelError>;

    /// Seconds since an arbitrary, per-world fixed point.
    fn wall_time(&self) -> f64;
}

impl<C: Channel + ?Sized> Channel for &C {
    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn world_size(&self) -> usize {
        (**self).world_size()
    }

    fn broadcast<T: Element>(&self, buf: &mut [T], root: usize) -> Result<(), ChannelError> {
        (**self).broadcast(buf, root)
    }

    fn send<T: Element>(&self, buf: &[T], dest: usize, tag: Tag) -> Result<(), ChannelError> {
        (**self).send(buf, dest, tag)
    }

    fn receive<T: Element>(
        &self,
        buf: &mut [T],
        source: usize,
        tag: Tag,
    ) -> Result<(), ChannelError> {
        (**self).receive(buf, source, tag)
    }

    fn barrier(&self) -> Result<(), ChannelError> {
        (**self).barrier()
    }

    fn wall_time(&self) -> f64 {
        (**self).wall_time()
    }
}

/// Broadcast matrix dimensions to all processes
pub fn broadcast_dimensions<C: Channel + ?Sized>(
    channel: &C,
    root: usize,
    rows: usize,
    cols: usize,
) -> Result<(usize, usize), ChannelError> {
    let mut dims = if channel.rank() == root {
        [rows as u64, cols as u64]
    } else {
        [0u64; 2]
    };

    channel.broadcast(&mut dims[..], root)?;

    Ok((dims[0] as usize, dims[1] as usize))
}

/// Replicate `matrix` from `root` onto every rank. Non-root ranks may pass
/// any matrix; it is replaced by a copy of the root's.
pub fn broadcast_matrix<T: Element, C: Channel + ?Sized>(
    channel: &C,
    matrix: &mut Matrix<T>,
    root: usize,
) -> Result<(), ChannelError> {
    let (rows, cols) = broadcast_dimensions(channel, root, matrix.rows(), matrix.cols())?;
    if channel.rank() != root {
        *matrix = Matrix::new(rows, cols);
    }
    channel.broadcast(matrix.as_mut_slice(), root)
}
