//! Row-block matrix multiplication, distributed over a [`Channel`] or
//! spread across a thread pool, plus the benchmark driver that times both.

pub mod bench;
pub mod channel;
pub mod coordinator;
pub mod distributed;
pub mod element;
pub mod error;
pub mod matrix;
pub mod partition;
pub mod shared;
pub mod worker;

pub use channel::{Channel, LocalChannel, LocalWorld};
pub use coordinator::Coordinator;
pub use distributed::DistributedMultiplier;
pub use element::Element;
pub use error::{BenchError, ChannelError, MatrixError, MultiplyError};
pub use matrix::Matrix;
pub use partition::{row_range, RowRange};
pub use shared::SharedMultiplier;
pub use worker::Worker;
