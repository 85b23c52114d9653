//! Configuration file support
//!
//! ```toml
//! [scan]
//! strategy = "afl"
//! last_sfi = 10
//! max_read_attempts = 64
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use emv_card::ScanPolicy;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Scan sub-object
    pub scan: ScanPolicy,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
