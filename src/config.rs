use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default configuration file, looked up in the working directory.
pub const CONFIG_PATH: &str = "plume.toml";

// ---------------------------------------------------------------------------
// Run / Loop / Index – the nested batch description
// ---------------------------------------------------------------------------

/// Leaf of the batch tree: one data file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Index {
    pub num: u32,
}

/// A numbered sub-unit of a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Loop {
    pub num: u32,
    pub indices: Vec<Index>,
}

/// A named simulation instance; its name is also its data sub-directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Run {
    pub name: String,
    pub loops: Vec<Loop>,
}

// ---------------------------------------------------------------------------
// Figure jobs
// ---------------------------------------------------------------------------

/// Gas concentration figure: one line per species over time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GasFigure {
    pub dir: PathBuf,
    pub prefix: String,
    pub suffix: String,
    pub species: Vec<String>,
    pub output: PathBuf,
}

/// Temperature / relative humidity / mixing height figure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvFigure {
    pub input: PathBuf,
    #[serde(default = "default_env_variable")]
    pub variable: String,
    pub output: PathBuf,
}

fn default_env_variable() -> String {
    "env_state".to_string()
}

// ---------------------------------------------------------------------------
// Config – everything a batch needs, loaded once at start
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub data_base_dir: PathBuf,
    pub data_type: String,
    pub runs: Vec<Run>,
    #[serde(default)]
    pub gas_figure: Option<GasFigure>,
    #[serde(default)]
    pub env_figure: Option<EnvFigure>,
}

/// Configuration problems caught before any data is touched.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("run #{0} has an empty name")]
    EmptyRunName(usize),
    #[error("data_type must not be empty")]
    EmptyDataType,
    #[error("figure output {0:?} must end in .svg or .png")]
    UnsupportedOutput(PathBuf),
    #[error("gas figure selects no species")]
    NoSpecies,
}

impl Config {
    /// Read and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in config {}", path.display()))
    }

    /// Parse and validate configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("parsing TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_type.is_empty() {
            return Err(ConfigError::EmptyDataType);
        }
        if let Some(i) = self.runs.iter().position(|r| r.name.trim().is_empty()) {
            return Err(ConfigError::EmptyRunName(i));
        }
        if let Some(gas) = &self.gas_figure {
            if gas.species.is_empty() {
                return Err(ConfigError::NoSpecies);
            }
            check_output(&gas.output)?;
        }
        if let Some(env) = &self.env_figure {
            check_output(&env.output)?;
        }
        Ok(())
    }

    /// Total number of leaf indices across all runs.
    pub fn leaf_count(&self) -> usize {
        self.runs
            .iter()
            .flat_map(|r| &r.loops)
            .map(|l| l.indices.len())
            .sum()
    }
}

fn check_output(path: &Path) -> Result<(), ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("svg") | Some("png") => Ok(()),
        _ => Err(ConfigError::UnsupportedOutput(path.to_path_buf())),
    }
}
