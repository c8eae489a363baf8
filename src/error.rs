//! Error types for matrix, channel and benchmark operations.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("data length {len} does not match dimensions {rows}x{cols}")]
    LengthMismatch { len: usize, rows: usize, cols: usize },

    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("index out of bounds: ({row}, {col}) for matrix {rows}x{cols}")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("row block [{start}, {end}) out of bounds for {rows} rows")]
    RowBlockOutOfBounds { start: usize, end: usize, rows: usize },

    #[error("missing `rows cols` header line")]
    MissingHeader,

    #[error("parse error on line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("expected {expected} values, found {found}")]
    Shape { expected: usize, found: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("rank {rank} is outside a world of size {size}")]
    InvalidRank { rank: usize, size: usize },

    #[error("expected {expected} elements, received {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("received message of a different element type")]
    TypeMismatch,

    #[error("peer {0} disconnected")]
    Disconnected(usize),
}

#[derive(Debug, Error)]
pub enum MultiplyError {
    #[error("matrix dimensions incompatible: A is {left_rows}x{left_cols}, B is {right_rows}x{right_cols}")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    #[error("active worker count {active} must be between 1 and the world size {world_size}")]
    Configuration { active: usize, world_size: usize },

    #[error("thread count must be at least 1")]
    NoThreads,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("communication failure: {0}")]
    Communication(#[from] ChannelError),

    #[error("result assembly failed: {0}")]
    Assembly(#[from] MatrixError),
}

#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Multiply(#[from] MultiplyError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BenchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }
}
