use super::preset::Preset;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

const STORAGE_VERSION: u32 = 1;

/// Durable home for user presets
///
/// `store` receives the complete candidate list and must either persist all of it
/// or fail without changing what a later `load` returns.
pub trait PresetStorage: Send + Sync {
    fn load(&self) -> Result<Vec<Preset>>;
    fn store(&self, presets: &[Preset]) -> Result<()>;
}

/// Keeps presets for the lifetime of the process only
#[derive(Debug, Default)]
pub struct MemoryStorage {
    presets: Mutex<Vec<Preset>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresetStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Preset>> {
        let presets = self
            .presets
            .lock()
            .map_err(|_| anyhow!("preset storage lock poisoned"))?;
        Ok(presets.clone())
    }

    fn store(&self, presets: &[Preset]) -> Result<()> {
        let mut stored = self
            .presets
            .lock()
            .map_err(|_| anyhow!("preset storage lock poisoned"))?;
        *stored = presets.to_vec();
        Ok(())
    }
}

#[derive(Serialize)]
struct StoredPresetsRef<'a> {
    version: u32,
    presets: &'a [Preset],
}

#[derive(Deserialize)]
struct StoredPresets {
    version: u32,
    presets: Vec<serde_json::Value>,
}

/// Presets persisted as a JSON file
///
/// Writes go to a sibling `.tmp` file that is renamed over the target, so a
/// failed write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PresetStorage for JsonFileStorage {
    /// Entries that no longer parse (e.g. an identifier dropped from the catalog)
    /// are skipped with a warning instead of failing the whole file.
    fn load(&self) -> Result<Vec<Preset>> {
        if !self.path.exists() {
            info!("No preset file at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let stored: StoredPresets = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", self.path.display()))?;

        if stored.version != STORAGE_VERSION {
            anyhow::bail!(
                "unsupported preset file version {} in {}",
                stored.version,
                self.path.display()
            );
        }

        let mut presets = Vec::with_capacity(stored.presets.len());
        for value in stored.presets {
            match serde_json::from_value::<Preset>(value) {
                Ok(preset) => presets.push(preset),
                Err(e) => warn!("Skipping unreadable preset in {}: {}", self.path.display(), e),
            }
        }

        info!("Loaded {} presets from {}", presets.len(), self.path.display());
        Ok(presets)
    }

    fn store(&self, presets: &[Preset]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let json = serde_json::to_vec_pretty(&StoredPresetsRef {
            version: STORAGE_VERSION,
            presets,
        })?;

        let temp = self.temp_path();
        fs::write(&temp, json).with_context(|| format!("writing {}", temp.display()))?;
        fs::rename(&temp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;

        info!("Stored {} presets to {}", presets.len(), self.path.display());
        Ok(())
    }
}
