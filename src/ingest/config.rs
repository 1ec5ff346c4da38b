use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub global: GlobalConfig,
    #[serde(default)]
    pub postcodes: Option<PostcodeSource>,
    #[serde(default)]
    pub boundaries: Option<BoundarySource>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalConfig {
    pub es_url: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Postcode pins, one CSV row per postcode with `lat`/`long` columns.
#[derive(Debug, Deserialize, Clone)]
pub struct PostcodeSource {
    pub csv: PathBuf,
    pub index: String,
}

/// Boundary documents, one JSON file per boundary.
#[derive(Debug, Deserialize, Clone)]
pub struct BoundarySource {
    pub dir: PathBuf,
    pub index: String,
}

fn default_batch_size() -> usize {
    500
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
