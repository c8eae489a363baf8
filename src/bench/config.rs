use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::error::BenchError;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "ROWBLOCK_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Square problem sizes, in sweep order.
    pub sizes: Vec<usize>,
    pub output_dir: PathBuf,
    pub min_value: i32,
    pub max_value: i32,
    /// Fixed RNG seed; fresh entropy when absent.
    pub seed: Option<u64>,
    /// Problem size for the thread-count sweep.
    pub shared_size: usize,
    /// Upper bound of the thread-count sweep; available parallelism when
    /// absent.
    pub max_threads: Option<usize>,
    /// Ranks in the in-process world; available parallelism when absent.
    pub world_size: Option<usize>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            sizes: vec![100, 200, 300, 400, 500, 1000, 2000],
            output_dir: PathBuf::from("result"),
            min_value: 0,
            max_value: 100,
            seed: None,
            shared_size: 1000,
            max_threads: None,
            world_size: None,
        }
    }
}

impl BenchConfig {
    /// Defaults, overridden by the file named in `ROWBLOCK_CONFIG` if set.
    pub fn load() -> Result<Self, BenchError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => BenchConfig::from_file(path),
            None => Ok(BenchConfig::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BenchError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
        BenchConfig::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, BenchError> {
        let config: BenchConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.sizes.is_empty() {
            return Err(BenchError::Config("`sizes` must not be empty".into()));
        }
        if self.sizes.contains(&0) {
            return Err(BenchError::Config("`sizes` must be positive".into()));
        }
        if self.min_value > self.max_value {
            return Err(BenchError::Config(format!(
                "`min_value` {} exceeds `max_value` {}",
                self.min_value, self.max_value
            )));
        }
        if self.max_threads == Some(0) {
            return Err(BenchError::Config("`max_threads` must be at least 1".into()));
        }
        if self.world_size == Some(0) {
            return Err(BenchError::Config("`world_size` must be at least 1".into()));
        }
        Ok(())
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads.unwrap_or_else(available_parallelism)
    }

    pub fn world_size(&self) -> usize {
        self.world_size.unwrap_or_else(available_parallelism)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
