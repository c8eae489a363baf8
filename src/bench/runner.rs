use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use tracing::{error, info, info_span, warn};

use super::config::BenchConfig;
use super::layout::OutputLayout;
use super::schedule::{thread_counts, worker_counts};
use super::table::{write_sequential_times, TimingTable};
use crate::channel::{broadcast_matrix, Channel};
use crate::coordinator::COORDINATOR;
use crate::distributed::DistributedMultiplier;
use crate::error::{BenchError, MultiplyError};
use crate::matrix::Matrix;
use crate::shared::SharedMultiplier;

/// Single-threaded baseline: for each size multiply two random matrices,
/// dump `A`, `B` and the result, and write `statistic.txt`.
pub fn run_sequential(config: &BenchConfig, layout: &OutputLayout) -> Result<Vec<(usize, f64)>, BenchError> {
    let mut rng = config.rng();
    let mut times = Vec::with_capacity(config.sizes.len());

    for &size in &config.sizes {
        let _span = info_span!("sequential", size).entered();
        let a = Matrix::random(size, size, config.min_value, config.max_value, &mut rng);
        let b = Matrix::random(size, size, config.min_value, config.max_value, &mut rng);

        let start = Instant::now();
        let result = a.multiply(&b)?;
        let seconds = start.elapsed().as_secs_f64();
        info!(seconds, "sequential multiply finished");

        layout.size_dir(size)?;
        a.save_to_file(layout.matrix_a(size))?;
        b.save_to_file(layout.matrix_b(size))?;
        result.save_to_file(layout.result(size))?;

        times.push((size, seconds));
    }

    let path = layout.sequential_times();
    let file = File::create(&path).map_err(|e| BenchError::io(&path, e))?;
    write_sequential_times(BufWriter::new(file), &times).map_err(|e| BenchError::io(&path, e))?;
    info!(path = %path.display(), "wrote sequential timings");

    Ok(times)
}

/// Thread-count sweep over one `shared_size` problem. Writes
/// `statistic.csv` under `layout`.
pub fn run_shared(config: &BenchConfig, layout: &OutputLayout) -> Result<TimingTable, BenchError> {
    let size = config.shared_size;
    let mut rng = config.rng();
    let a = Matrix::random(size, size, config.min_value, config.max_value, &mut rng);
    let b = Matrix::random(size, size, config.min_value, config.max_value, &mut rng);

    let counts = thread_counts(config.max_threads());
    let mut table = TimingTable::for_threads(counts.clone(), vec![size]);

    for (index, &threads) in counts.iter().enumerate() {
        let _span = info_span!("shared", size, threads).entered();
        let multiplier = SharedMultiplier::new(threads)?;

        let start = Instant::now();
        multiplier.multiply(&a, &b)?;
        let seconds = start.elapsed().as_secs_f64();

        info!(seconds, "shared-memory multiply finished");
        table.record(index, 0, seconds);
    }

    table.save_csv(layout.timing_csv())?;
    info!(path = %layout.timing_csv().display(), "wrote shared-memory timings");
    Ok(table)
}

/// Distributed sweep. Every rank of `channel` must call this with the same
/// config.
///
/// For each size the coordinator generates and dumps `A` and `B`, then both
/// are broadcast. Each worker count is timed between two barriers with the
/// channel's wall clock. The coordinator dumps the last product, writes
/// `statistic.csv` and returns the table; other ranks return `None`.
///
/// A configuration rejected by validation is logged and left `NaN`. A
/// communication failure aborts the sweep. Dump failures on the coordinator
/// are logged and skipped so every rank still reaches the same collectives;
/// an unusable output directory is reported once the sweep is over.
pub fn run_distributed<C: Channel>(channel: C, config: &BenchConfig) -> Result<Option<TimingTable>, BenchError> {
    let rank = channel.rank();
    let is_coordinator = rank == COORDINATOR;
    let counts = worker_counts(channel.world_size());

    let layout = is_coordinator.then(|| OutputLayout::create(&config.output_dir));
    if let Some(Err(e)) = &layout {
        warn!(error = %e, "output directory unavailable, skipping matrix dumps");
    }
    let mut rng = config.rng();
    let mut table = TimingTable::for_processes(counts.clone(), config.sizes.clone());
    let mut engine = DistributedMultiplier::new(channel);

    engine.channel().barrier()?;

    for (size_index, &size) in config.sizes.iter().enumerate() {
        let _span = info_span!("distributed", rank, size).entered();

        let mut a = Matrix::<i32>::new(0, 0);
        let mut b = Matrix::<i32>::new(0, 0);
        if is_coordinator {
            info!("processing {}x{}", size, size);
            a = Matrix::random(size, size, config.min_value, config.max_value, &mut rng);
            b = Matrix::random(size, size, config.min_value, config.max_value, &mut rng);
            if let Some(Ok(layout)) = &layout {
                if let Err(e) = dump_inputs(layout, size, &a, &b) {
                    warn!(error = %e, "failed to dump input matrices");
                }
            }
        }

        broadcast_matrix(engine.channel(), &mut a, COORDINATOR)?;
        broadcast_matrix(engine.channel(), &mut b, COORDINATOR)?;

        let mut last = None;
        for (worker_index, &workers) in counts.iter().enumerate() {
            engine.channel().barrier()?;
            let start = engine.channel().wall_time();

            let outcome = engine.multiply(&a, &b, workers);

            engine.channel().barrier()?;
            let seconds = engine.channel().wall_time() - start;

            match outcome {
                Ok(result) => {
                    if result.is_some() {
                        last = result;
                    }
                    if is_coordinator {
                        info!(workers, seconds, "distributed multiply finished");
                        table.record(worker_index, size_index, seconds);
                    }
                }
                Err(MultiplyError::Communication(e)) => {
                    error!(workers, error = %e, "communication failed, aborting sweep");
                    return Err(MultiplyError::Communication(e).into());
                }
                Err(e) => {
                    warn!(workers, error = %e, "skipping configuration");
                }
            }
        }

        if let (Some(Ok(layout)), Some(result)) = (&layout, &last) {
            if let Err(e) = result.save_to_file(layout.result(size)) {
                warn!(error = %e, "failed to dump result matrix");
            }
        }
    }

    match layout {
        Some(layout) => {
            let layout = layout?;
            table.save_csv(layout.timing_csv())?;
            info!(path = %layout.timing_csv().display(), "wrote distributed timings");
            Ok(Some(table))
        }
        None => Ok(None),
    }
}

fn dump_inputs(layout: &OutputLayout, size: usize, a: &Matrix<i32>, b: &Matrix<i32>) -> Result<(), BenchError> {
    layout.size_dir(size)?;
    a.save_to_file(layout.matrix_a(size))?;
    b.save_to_file(layout.matrix_b(size))?;
    Ok(())
}
