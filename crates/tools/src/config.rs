//! Optional TOML settings for the generate command; flags override them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_GRID_SIDE: usize = 10;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub grid_side: Option<usize>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub ascii: Option<bool>,
}

impl MapConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Settings after layering flags over the file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub grid_side: usize,
    pub seed: u64,
    pub output: Option<PathBuf>,
    pub ascii: bool,
}

pub struct Overrides {
    pub grid_side: Option<usize>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub ascii: bool,
}

impl MapConfig {
    pub fn resolve(self, overrides: Overrides) -> Resolved {
        Resolved {
            grid_side: overrides.grid_side.or(self.grid_side).unwrap_or(DEFAULT_GRID_SIDE),
            seed: overrides.seed.or(self.seed).unwrap_or(DEFAULT_SEED),
            output: overrides.output.or(self.output),
            ascii: overrides.ascii || self.ascii.unwrap_or(false),
        }
    }
}
