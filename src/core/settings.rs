// src/core/settings.rs

//! Per-project key/value settings.
//!
//! Keys are flat dotted strings (`controller.code.driver`, `model_id`). Values are
//! either scalar ids or component descriptors. [`ProjectSettings`] keeps them in
//! `<home>/.datmo/settings.toml` so they can be inspected and edited by hand.

use crate::constants::{DATMO_DIR, SETTINGS_FILENAME};
use crate::models::SettingValue;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or writing settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    #[error("Could not access settings file '{path}': {source}")]
    Io {
        /// Path of the settings file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid TOML or has an unexpected shape.
    #[error("Settings file '{path}' is malformed: {source}")]
    Parse {
        /// Path of the settings file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// The settings could not be serialized.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A persistent key/value store scoped to one project.
pub trait SettingsStore: fmt::Debug {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<SettingValue>, SettingsError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError>;
}

/// File-backed settings for a project directory.
///
/// Every call goes to disk, so two stores opened on the same project observe
/// each other's writes.
#[derive(Debug, Clone)]
pub struct ProjectSettings {
    path: PathBuf,
}

impl ProjectSettings {
    /// Opens the settings of the project rooted at `home`. The file is created
    /// on the first `set`.
    pub fn open(home: &Path) -> Self {
        let path = home.join(DATMO_DIR).join(SETTINGS_FILENAME);
        debug!("Opening project settings at '{}'", path.display());
        Self { path }
    }

    /// Path of the backing TOML file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, SettingValue>, SettingsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, values: &BTreeMap<String, SettingValue>) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let toml_string = toml::to_string_pretty(values)?;
        fs::write(&self.path, toml_string).map_err(io_err)
    }
}

impl SettingsStore for ProjectSettings {
    fn get(&self, key: &str) -> Result<Option<SettingValue>, SettingsError> {
        trace!("settings get '{}'", key);
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        trace!("settings set '{}'", key);
        let mut values = self.load()?;
        values.insert(key.to_string(), value);
        self.save(&values)
    }
}

/// Settings kept in memory only. Used for ephemeral controllers and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: BTreeMap<String, SettingValue>,
}

impl MemorySettings {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<SettingValue>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
