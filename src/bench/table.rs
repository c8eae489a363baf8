use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::BenchError;

/// Elapsed seconds per (worker count, problem size). Cells never recorded
/// stay `NaN`.
#[derive(Debug, Clone)]
pub struct TimingTable {
    label: &'static str,
    worker_counts: Vec<usize>,
    sizes: Vec<usize>,
    seconds: Vec<Vec<f64>>,
}

impl TimingTable {
    pub fn new(label: &'static str, worker_counts: Vec<usize>, sizes: Vec<usize>) -> Self {
        let seconds = vec![vec![f64::NAN; sizes.len()]; worker_counts.len()];
        TimingTable {
            label,
            worker_counts,
            sizes,
            seconds,
        }
    }

    /// Rows keyed by process count, as written by the distributed sweep.
    pub fn for_processes(worker_counts: Vec<usize>, sizes: Vec<usize>) -> Self {
        TimingTable::new("Processes", worker_counts, sizes)
    }

    /// Rows keyed by thread count, as written by the shared-memory sweep.
    pub fn for_threads(thread_counts: Vec<usize>, sizes: Vec<usize>) -> Self {
        TimingTable::new("Threads", thread_counts, sizes)
    }

    pub fn worker_counts(&self) -> &[usize] {
        &self.worker_counts
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Record by position in the worker-count and size lists.
    pub fn record(&mut self, worker_index: usize, size_index: usize, seconds: f64) {
        self.seconds[worker_index][size_index] = seconds;
    }

    pub fn get(&self, workers: usize, size: usize) -> Option<f64> {
        let row = self.worker_counts.iter().position(|&w| w == workers)?;
        let col = self.sizes.iter().position(|&s| s == size)?;
        Some(self.seconds[row][col])
    }

    /// `<Label>\Sizes,<s1>,...` then `<workers>,<t1>,...` with 4 decimals.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "{}\\Sizes", self.label)?;
        for size in &self.sizes {
            write!(writer, ",{}", size)?;
        }
        writeln!(writer)?;

        for (workers, row) in self.worker_counts.iter().zip(&self.seconds) {
            write!(writer, "{}", workers)?;
            for seconds in row {
                write!(writer, ",{:.4}", seconds)?;
            }
            writeln!(writer)?;
        }
        writer.flush()
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), BenchError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| BenchError::io(path, e))?;
        self.write_csv(BufWriter::new(file))
            .map_err(|e| BenchError::io(path, e))
    }
}

/// `Sizes\tTimes` then one `size\tseconds` line per sequential run.
pub fn write_sequential_times<W: Write>(mut writer: W, times: &[(usize, f64)]) -> std::io::Result<()> {
    writeln!(writer, "Sizes\tTimes")?;
    for (size, seconds) in times {
        writeln!(writer, "{}\t{}", size, seconds)?;
    }
    writer.flush()
}
