//! User settings and the after-creation behaviour.
//!
//! Settings are persisted as a JSON object. Loading merges whatever was
//! persisted over [`Settings::default`], so older files with missing
//! fields keep working. Older files that stored a plain
//! `open_in_new_tab` boolean are migrated to [`AfterCreation`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SpawnError};
use crate::store::OpenPlacement;

/// What to do with a note once it has been created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AfterCreation {
    /// Leave the note where it is and tell the user.
    #[default]
    DoNothing,
    /// Open the note in the currently active view.
    OpenActive,
    /// Open the note in a new tab.
    OpenNewTab,
}

impl AfterCreation {
    pub const ALL: [Self; 3] = [Self::DoNothing, Self::OpenActive, Self::OpenNewTab];

    /// Where to open the note, or `None` to leave it closed.
    #[must_use]
    pub fn placement(self) -> Option<OpenPlacement> {
        match self {
            Self::DoNothing => None,
            Self::OpenActive => Some(OpenPlacement::ActiveView),
            Self::OpenNewTab => Some(OpenPlacement::NewTab),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DoNothing => "do-nothing",
            Self::OpenActive => "open-active",
            Self::OpenNewTab => "open-new-tab",
        }
    }
}

/// Legacy toggle: `true` meant "open in a new tab".
impl From<bool> for AfterCreation {
    fn from(open_in_new_tab: bool) -> Self {
        if open_in_new_tab {
            Self::OpenNewTab
        } else {
            Self::DoNothing
        }
    }
}

impl fmt::Display for AfterCreation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AfterCreation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidSetting {
                key: "after_creation".to_string(),
                value: s.to_string(),
            })
    }
}

/// Either form an after-creation value may be persisted in.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredAfterCreation {
    Toggle(bool),
    Named(String),
}

impl<'de> Deserialize<'de> for AfterCreation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match StoredAfterCreation::deserialize(deserializer)? {
            StoredAfterCreation::Toggle(flag) => Ok(Self::from(flag)),
            StoredAfterCreation::Named(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Vault-relative folder holding the templates.
    pub template_folder: String,
    pub after_creation: AfterCreation,
    /// Command used to open notes. Falls back to `$VISUAL` then `$EDITOR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_folder: "templates".to_string(),
            after_creation: AfterCreation::default(),
            editor: None,
        }
    }
}

/// Persisted overrides; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct StoredSettings {
    template_folder: Option<String>,
    after_creation: Option<AfterCreation>,
    open_in_new_tab: Option<bool>,
    editor: Option<String>,
}

impl Settings {
    /// Merge persisted data over the defaults.
    ///
    /// `None` (nothing persisted yet) yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Serialization`] if the persisted data is not a
    /// settings object.
    pub fn from_stored(stored: Option<serde_json::Value>) -> Result<Self, SpawnError> {
        let Some(value) = stored else {
            return Ok(Self::default());
        };
        let stored: StoredSettings =
            serde_json::from_value(value).map_err(|e| SpawnError::Serialization(e.to_string()))?;

        let defaults = Self::default();
        let after_creation = stored
            .after_creation
            .or(stored.open_in_new_tab.map(AfterCreation::from))
            .unwrap_or(defaults.after_creation);

        Ok(Self {
            template_folder: stored.template_folder.unwrap_or(defaults.template_folder),
            after_creation,
            editor: stored.editor.or(defaults.editor),
        })
    }

    /// The whole settings object, ready to persist.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Serialization`] if serialization fails.
    pub fn to_stored(&self) -> Result<serde_json::Value, SpawnError> {
        serde_json::to_value(self).map_err(|e| SpawnError::Serialization(e.to_string()))
    }

    /// The template folder with surrounding slashes and whitespace removed.
    /// An empty result means the vault root.
    #[must_use]
    pub fn template_folder_path(&self) -> &str {
        self.template_folder.trim().trim_matches('/')
    }
}
