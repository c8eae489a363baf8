//! Distributed sweep under MPI: `mpirun -n <N> rowblock-mpi-bench`.

use std::process::ExitCode;

use rowblock_matmul::bench::{self, verify, BenchConfig};
use rowblock_matmul::channel::{Channel, MpiChannel};
use rowblock_matmul::BenchError;
use tracing::{error, info};

fn main() -> ExitCode {
    bench::init_tracing();

    let Some(universe) = mpi::initialize() else {
        error!("failed to initialize MPI");
        return ExitCode::FAILURE;
    };
    let channel = MpiChannel::new(universe.world());
    let rank = channel.rank();

    match run(channel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(rank, error = %e, "benchmark failed");
            ExitCode::FAILURE
        }
    }
}

fn run(channel: MpiChannel) -> Result<(), BenchError> {
    let config = BenchConfig::load()?;
    config.validate()?;
    info!(rank = channel.rank(), size = channel.world_size(), "joined world");

    if bench::run_distributed(channel, &config)?.is_some() {
        let layout = bench::OutputLayout::create(&config.output_dir)?;
        verify::write_report(&layout, &config.sizes)?;
    }
    Ok(())
}
