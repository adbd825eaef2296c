use crate::config::{self, ConfigError, FuzzConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(name = "gapbuf-fuzz")]
#[command(version = "0.1.0")]
#[command(about = "Randomized operation driver for the gap buffer")]
pub struct CliArgs {
    /// Driver config file (TOML); defaults to the user's config directory
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// RNG seed, for reproducing a run
    #[arg(long, short = 's')]
    pub seed: Option<u64>,

    /// Number of operations to run
    #[arg(long, short = 'n')]
    pub iterations: Option<u64>,

    /// Initial capacity of the growable buffer
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Use a caller-supplied region of this many bytes instead of a growable buffer
    #[arg(long)]
    pub fixed_region: Option<usize>,

    /// Upper bound on the length of inserted strings
    #[arg(long)]
    pub max_insert_len: Option<usize>,

    /// Skip the per-step invariant and model checks
    #[arg(long)]
    pub no_check: bool,
}

impl CliArgs {
    /// Loads the config file (explicit path, else the first one found in the
    /// user's config locations, else defaults) and applies flag overrides.
    pub fn resolve_config(&self) -> Result<FuzzConfig, ConfigError> {
        let mut config = match self.config.clone().or_else(config::find_config_file) {
            Some(path) => FuzzConfig::from_file(&path)?,
            None => FuzzConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(capacity) = self.capacity {
            config.initial_capacity = capacity;
        }
        if let Some(len) = self.fixed_region {
            config.fixed_region = Some(len);
        }
        if let Some(len) = self.max_insert_len {
            config.max_insert_len = len;
        }
        if self.no_check {
            config.check_invariants = false;
        }
        Ok(config)
    }
}

pub fn parse_args() -> Result<CliArgs, Box<dyn std::error::Error>> {
    Ok(CliArgs::parse())
}
