//! Where benchmark output lands on disk. Paths are always built from the
//! layout root; the process working directory is never changed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BenchError;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Use `root` as the output directory, creating it if needed.
    pub fn create<P: Into<PathBuf>>(root: P) -> Result<Self, BenchError> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(OutputLayout { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<name>`, created if needed.
    pub fn section(&self, name: &str) -> Result<OutputLayout, BenchError> {
        OutputLayout::create(self.root.join(name))
    }

    /// `<root>/<size>`, created if needed.
    pub fn size_dir(&self, size: usize) -> Result<PathBuf, BenchError> {
        let dir = self.root.join(size.to_string());
        ensure_dir(&dir)?;
        Ok(dir)
    }

    pub fn matrix_a(&self, size: usize) -> PathBuf {
        self.root.join(size.to_string()).join("A.txt")
    }

    pub fn matrix_b(&self, size: usize) -> PathBuf {
        self.root.join(size.to_string()).join("B.txt")
    }

    pub fn result(&self, size: usize) -> PathBuf {
        self.root.join(size.to_string()).join("result.txt")
    }

    pub fn timing_csv(&self) -> PathBuf {
        self.root.join("statistic.csv")
    }

    pub fn sequential_times(&self) -> PathBuf {
        self.root.join("statistic.txt")
    }

    pub fn compare_report(&self) -> PathBuf {
        self.root.join("compare_result.txt")
    }
}

fn ensure_dir(dir: &Path) -> Result<(), BenchError> {
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(|e| BenchError::io(dir, e))?;
        debug!(dir = %dir.display(), "created directory");
    }
    Ok(())
}
