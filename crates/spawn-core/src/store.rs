//! Host capabilities consumed by the spawn flow.
//!
//! The core never touches a file system or a UI directly. A host provides
//! a [`NoteStore`] for vault access and a [`Workspace`] for talking to the
//! user; `spawn-vault` implements the store over a directory.

use serde::Serialize;

use crate::error::{CreateError, Result};
use crate::frontmatter::Frontmatter;

/// A folder inside the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NoteFolder {
    /// Vault-relative, `/`-separated path. Empty for the vault root.
    pub path: String,
}

/// A file inside the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NoteFile {
    /// Vault-relative, `/`-separated path including the extension.
    pub path: String,
    /// File name without its extension.
    pub basename: String,
    /// Extension without the dot, empty if there is none.
    pub extension: String,
}

impl NoteFile {
    /// Build a handle from a vault-relative path.
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path);
        let (basename, extension) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
            _ => (name.to_string(), String::new()),
        };
        Self {
            path,
            basename,
            extension,
        }
    }

    /// Folder part of the path, empty for files at the vault root.
    #[must_use]
    pub fn parent(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(parent, _)| parent)
    }
}

/// Join folder segments and a file name into a vault path.
#[must_use]
pub fn join_path(segments: &[String], file_name: &str) -> String {
    let mut path = segments.join("/");
    if !path.is_empty() {
        path.push('/');
    }
    path.push_str(file_name);
    path
}

/// Vault access needed to spawn a note.
pub trait NoteStore {
    /// Look up a folder. `None` if nothing (or a file) is at `path`.
    fn folder(&self, path: &str) -> Option<NoteFolder>;

    /// Files directly inside `folder`, folders excluded, ordered by name.
    fn list_files(&self, folder: &NoteFolder) -> Result<Vec<NoteFile>>;

    /// Full text of a file.
    fn read(&self, file: &NoteFile) -> Result<String>;

    /// Make sure a folder and its parents exist.
    fn ensure_folder(&self, path: &str) -> Result<()>;

    /// Create a new file, failing with [`CreateError::AlreadyExists`] when
    /// something is already at `path`. The check and the create are one
    /// atomic step.
    fn create(&self, path: &str, content: &str) -> std::result::Result<NoteFile, CreateError>;

    /// Rewrite only the frontmatter block of `file` through `mutate`.
    fn process_frontmatter(
        &self,
        file: &NoteFile,
        mutate: &mut dyn FnMut(&mut Frontmatter),
    ) -> Result<()>;

    /// Parsed frontmatter of `file`, `None` if it has no block.
    fn read_frontmatter(&self, file: &NoteFile) -> Result<Option<Frontmatter>> {
        Frontmatter::from_document(&self.read(file)?)
    }
}

/// Where an opened note should appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenPlacement {
    ActiveView,
    NewTab,
}

/// User-facing side of the host.
pub trait Workspace {
    /// Show a message to the user. Never blocks, never fails.
    fn notify(&self, message: &str);

    /// Open `file` in the given placement.
    fn open(&self, file: &NoteFile, placement: OpenPlacement) -> Result<()>;
}
