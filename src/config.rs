// src/config.rs - TOML configuration for the randomized operation driver

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Invalid config format: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Relative frequency of each operation the driver generates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OpWeights {
    pub insert_bytes: u32,
    pub insert_text: u32,
    pub move_absolute: u32,
    pub move_relative: u32,
    pub remove_forwards: u32,
    pub remove_backwards: u32,
    pub iterate_lines: u32,
}

impl Default for OpWeights {
    fn default() -> Self {
        Self {
            insert_bytes: 1,
            insert_text: 1,
            move_absolute: 1,
            move_relative: 1,
            remove_forwards: 1,
            remove_backwards: 1,
            iterate_lines: 1,
        }
    }
}

impl OpWeights {
    pub fn as_array(&self) -> [u32; 7] {
        [
            self.insert_bytes,
            self.insert_text,
            self.move_absolute,
            self.move_relative,
            self.remove_forwards,
            self.remove_backwards,
            self.iterate_lines,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FuzzConfig {
    /// RNG seed; drawn from entropy when absent.
    pub seed: Option<u64>,
    pub iterations: u64,
    pub initial_capacity: usize,
    /// Run against a caller-supplied region of this many bytes (header
    /// included) instead of a growable buffer.
    pub fixed_region: Option<usize>,
    pub max_insert_len: usize,
    pub check_invariants: bool,
    pub weights: OpWeights,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            seed: None,
            iterations: 10_000,
            initial_capacity: 0,
            fixed_region: None,
            max_insert_len: 32,
            check_invariants: true,
            weights: OpWeights::default(),
        }
    }
}

impl FuzzConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

pub fn get_config_dir() -> PathBuf {
    let config_home = dirs::config_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config")
    });
    config_home.join("gapbuf")
}

/// First existing driver config among the user's config locations.
pub fn find_config_file() -> Option<PathBuf> {
    let paths = vec![
        get_config_dir().join("fuzz.toml"),
        dirs::home_dir()?.join(".gapbuf").join("fuzz.toml"),
    ];

    paths.into_iter().find(|p| p.exists())
}
