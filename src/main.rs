use std::process::ExitCode;

use rowblock_matmul::bench::{self, verify, BenchConfig, OutputLayout};
use rowblock_matmul::channel::LocalWorld;
use rowblock_matmul::BenchError;
use tracing::{error, info};

fn main() -> ExitCode {
    bench::init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "benchmark failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), BenchError> {
    let config = BenchConfig::load()?;
    config.validate()?;
    let root = OutputLayout::create(&config.output_dir)?;
    info!(output = %root.root().display(), "starting benchmark");

    let sequential = root.section("sequential")?;
    bench::run_sequential(&config, &sequential)?;
    verify::write_report(&sequential, &config.sizes)?;

    let shared = root.section("shared")?;
    bench::run_shared(&config, &shared)?;

    let distributed = BenchConfig {
        output_dir: root.root().join("distributed"),
        ..config.clone()
    };
    let world_size = config.world_size();
    info!(world_size, "running distributed sweep on a local world");
    let outcomes = LocalWorld::run(world_size, |channel| bench::run_distributed(channel, &distributed));
    for outcome in outcomes {
        outcome?;
    }
    let layout = OutputLayout::create(&distributed.output_dir)?;
    verify::write_report(&layout, &distributed.sizes)?;

    Ok(())
}
