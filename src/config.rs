use crate::preset::{JsonFileStorage, MemoryStorage, PresetStorage};
use crate::session::Limits;
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding user presets; presets live in memory only when unset
    pub presets_path: Option<String>,
}

impl StorageConfig {
    pub fn open(&self) -> Box<dyn PresetStorage> {
        match &self.presets_path {
            Some(path) => Box::new(JsonFileStorage::new(path)),
            None => Box::new(MemoryStorage::new()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AgentConfig {
    /// Enriched portfolio dataset produced by the data pipeline
    pub portfolio_data_path: Option<String>,
}

impl AgentConfig {
    pub fn portfolio_dataset(&self) -> Option<PortfolioDataset> {
        self.portfolio_data_path.as_deref().map(PortfolioDataset::new)
    }
}

/// Reference to the pipeline's final JSON document
///
/// Only its location is tracked here; the schema belongs to whatever grounds the
/// conversation on it.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioDataset {
    path: PathBuf,
}

impl PortfolioDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
