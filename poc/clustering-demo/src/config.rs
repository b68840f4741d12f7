//! Demo configuration, loaded from `resonance.toml`.

use anyhow::{Context, Result};
use resonance::prelude::{EngineConfig, SupervisedConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub supervised: SupervisedConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Synthetic Gaussian-ish blobs in the unit square.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_clusters")]
    pub clusters: usize,
    #[serde(default = "default_points_per_cluster")]
    pub points_per_cluster: usize,
    #[serde(default = "default_spread")]
    pub spread: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Hypersphere radius ceiling; defaults to the unit square's diagonal.
    #[serde(default = "default_radius_bound")]
    pub radius_bound: f64,
}

// Default value functions
fn default_clusters() -> usize { 4 }
fn default_points_per_cluster() -> usize { 150 }
fn default_spread() -> f64 { 0.05 }
fn default_seed() -> u64 { 42 }
fn default_workers() -> usize { 4 }
fn default_radius_bound() -> f64 { std::f64::consts::SQRT_2 }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            clusters: default_clusters(),
            points_per_cluster: default_points_per_cluster(),
            spread: default_spread(),
            seed: default_seed(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            radius_bound: default_radius_bound(),
        }
    }
}

impl DemoConfig {
    /// Load from an explicit path, else from `resonance.toml` in the current
    /// or a parent directory, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config: {}", path.display()))
            }
            None => Ok(DemoConfig::default()),
        }
    }
}

fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join("resonance.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
