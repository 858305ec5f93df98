use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PREVIEW_DEPTH_KEY: &str = "previewDepth";

/// Small string key-value store that survives restarts.
pub trait PrefStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Flat `key = "value"` toml file under the user's data dir.
pub struct FilePrefStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePrefStore {
    pub fn open_default() -> Option<Self> {
        let dirs = super::config::project_dirs()?;
        Some(Self::open(dirs.data_dir().join("prefs.toml")))
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = read_values(&path).unwrap_or_else(|err| {
            tracing::debug!(path = %path.display(), "no stored prefs: {err:#}");
            BTreeMap::new()
        });
        Self { path, values }
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create prefs directory {}", parent.display()))?;
        }
        let data = toml::to_string(&self.values).context("failed to serialize prefs")?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write prefs {}", self.path.display()))?;
        Ok(())
    }
}

fn read_values(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read prefs {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse prefs {}", path.display()))
}

impl PrefStore for FilePrefStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// Non-persistent store, used when no data dir exists and in tests.
#[derive(Default)]
pub struct MemoryPrefStore {
    values: BTreeMap<String, String>,
}

impl PrefStore for MemoryPrefStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Unset means enabled; anything but `"true"` means disabled.
pub fn load_preview_depth(store: &dyn PrefStore) -> bool {
    match store.get(PREVIEW_DEPTH_KEY) {
        Some(saved) => saved == "true",
        None => true,
    }
}

/// Best-effort write; failures are logged and otherwise ignored.
pub fn store_preview_depth(store: &mut dyn PrefStore, enabled: bool) {
    let value = if enabled { "true" } else { "false" };
    if let Err(err) = store.set(PREVIEW_DEPTH_KEY, value) {
        tracing::warn!("could not persist depth preview: {err:#}");
    }
}
