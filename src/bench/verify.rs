//! Re-checks dumped products against a fresh sequential multiply.

use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::{info, warn};

use super::layout::OutputLayout;
use crate::error::BenchError;
use crate::matrix::Matrix;

/// Reload `A`, `B` and `result` for `size` and check `A * B == result`.
pub fn verify_size(layout: &OutputLayout, size: usize) -> Result<bool, BenchError> {
    let a = Matrix::<i32>::load_from_file(layout.matrix_a(size))?;
    let b = Matrix::<i32>::load_from_file(layout.matrix_b(size))?;
    let result = Matrix::<i32>::load_from_file(layout.result(size))?;
    Ok(a.multiply(&b)? == result)
}

/// Verify every size and write `compare_result.txt`. Sizes whose dumps
/// cannot be read are reported as incorrect.
pub fn write_report(layout: &OutputLayout, sizes: &[usize]) -> Result<Vec<(usize, bool)>, BenchError> {
    let verdicts: Vec<(usize, bool)> = sizes
        .iter()
        .map(|&size| {
            let correct = verify_size(layout, size).unwrap_or_else(|e| {
                warn!(size, error = %e, "could not verify");
                false
            });
            (size, correct)
        })
        .collect();

    let path = layout.compare_report();
    let file = File::create(&path).map_err(|e| BenchError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    for (size, correct) in &verdicts {
        let status = if *correct { "correct" } else { "incorrect" };
        writeln!(writer, "Matrix {size}x{size} multiplication: {status}")
            .map_err(|e| BenchError::io(&path, e))?;
    }
    writer.flush().map_err(|e| BenchError::io(&path, e))?;

    info!(report = %path.display(), "wrote verification report");
    Ok(verdicts)
}
