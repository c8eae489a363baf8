//! Benchmark driver: sweeps problem sizes and worker counts, dumps the
//! matrices it multiplied and writes timing tables.

pub mod config;
pub mod layout;
pub mod runner;
pub mod schedule;
pub mod table;
pub mod verify;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub use config::BenchConfig;
pub use layout::OutputLayout;
pub use runner::{run_distributed, run_sequential, run_shared};
pub use table::TimingTable;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    // A subscriber may already be installed, e.g. by a test harness.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
