//! Settings persistence in `<vault>/.spawn/settings.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use spawn_core::error::{Result, SpawnError};
use spawn_core::settings::Settings;

/// Directory holding spawn's own files inside a vault.
pub const SPAWN_DIR: &str = ".spawn";

/// File name of the persisted settings.
pub const SETTINGS_FILE: &str = "settings.json";

/// The settings file of one vault.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    #[must_use]
    pub fn for_vault(root: &Path) -> Self {
        Self {
            path: root.join(SPAWN_DIR).join(SETTINGS_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load settings, merging the file over the defaults.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Io`] if the file cannot be read and
    /// [`SpawnError::Serialization`] if it is not valid settings JSON.
    pub fn load(&self) -> Result<Settings> {
        let stored = match fs::read_to_string(&self.path) {
            Ok(text) => Some(
                serde_json::from_str(&text)
                    .map_err(|e| SpawnError::Serialization(e.to_string()))?,
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Settings::from_stored(stored)
    }

    /// Write the whole settings object.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Io`] if the file cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&settings.to_stored()?)
            .map_err(|e| SpawnError::Serialization(e.to_string()))?;
        fs::write(&self.path, json + "\n")?;
        debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }

    /// Load, change one thing, and save straight away.
    ///
    /// # Errors
    ///
    /// Propagates load and save failures.
    pub fn update(&self, change: impl FnOnce(&mut Settings)) -> Result<Settings> {
        let mut settings = self.load()?;
        change(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}
