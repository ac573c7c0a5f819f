// Copyright (c) 2026 rezky_nightky

use std::collections::HashMap;
use std::path::PathBuf;

use color_eyre::eyre::{ContextCompat as _, WrapErr as _};
use color_eyre::Result;
use tracing::{info, warn};

use crate::settings::RainConfig;

/// Storage key the rain configuration lives under.
pub const CONFIG_KEY: &str = "lluvia-config";

/// A string key/value store that survives restarts.
pub trait Storage {
    /// `None` when the key was never written or can't be read.
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

/// `<user config dir>/lluvia`, e.g. `~/.config/lluvia` on Linux.
pub fn default_directory() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Couldn't find the user's config directory")?;
    Ok(base.join("lluvia"))
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.directory).wrap_err_with(|| {
            format!("creating config directory {}", self.directory.display())
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, value).wrap_err_with(|| format!("writing {}", path.display()))
    }
}

/// Keeps everything in memory; used for `--no-persist`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Reads the saved configuration. Anything missing or unreadable falls back
/// to the defaults, field by field.
pub fn load_config(storage: &dyn Storage) -> RainConfig {
    match storage.get_item(CONFIG_KEY) {
        Some(raw) => {
            let config = RainConfig::from_json_lossy(&raw);
            info!(?config, "loaded saved config");
            config
        }
        None => {
            info!("no saved config, using defaults");
            RainConfig::default()
        }
    }
}

/// Saves the configuration. Failures are logged and otherwise ignored: the
/// animation keeps going with the in-memory values.
pub fn persist_config(storage: &mut dyn Storage, config: &RainConfig) {
    if let Err(error) = storage.set_item(CONFIG_KEY, &config.to_json()) {
        warn!(?error, "couldn't save config");
    }
}
