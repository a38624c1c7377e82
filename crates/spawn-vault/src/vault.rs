//! [`NoteStore`] over a directory on disk.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use spawn_core::error::{CreateError, Result, SpawnError};
use spawn_core::frontmatter::{rewrite_frontmatter, Frontmatter};
use spawn_core::store::{NoteFile, NoteFolder, NoteStore};

/// A vault rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open the vault at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Vault`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SpawnError::Vault(format!(
                "vault root {} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a vault-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Vault`] for paths that would leave the vault.
    pub fn absolute(&self, relative: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            match Path::new(segment).components().next() {
                Some(Component::Normal(_)) if !segment.contains('\\') => path.push(segment),
                Some(Component::CurDir) => {}
                _ => {
                    return Err(SpawnError::Vault(format!(
                        "path {relative} escapes the vault"
                    )))
                }
            }
        }
        Ok(path)
    }
}

impl NoteStore for FsVault {
    fn folder(&self, path: &str) -> Option<NoteFolder> {
        let absolute = self.absolute(path).ok()?;
        absolute.is_dir().then(|| NoteFolder {
            path: path.trim_matches('/').to_string(),
        })
    }

    fn list_files(&self, folder: &NoteFolder) -> Result<Vec<NoteFile>> {
        let dir = self.absolute(&folder.path)?;
        let mut files = Vec::new();

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            // Skip hidden files and names that are not valid UTF-8
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let path = if folder.path.is_empty() {
                name
            } else {
                format!("{}/{name}", folder.path)
            };
            files.push(NoteFile::from_path(path));
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn read(&self, file: &NoteFile) -> Result<String> {
        Ok(fs::read_to_string(self.absolute(&file.path)?)?)
    }

    fn ensure_folder(&self, path: &str) -> Result<()> {
        let absolute = self.absolute(path)?;
        fs::create_dir_all(&absolute)?;
        Ok(())
    }

    fn create(&self, path: &str, content: &str) -> std::result::Result<NoteFile, CreateError> {
        let absolute = self.absolute(path).map_err(|e| CreateError::Io {
            path: path.to_string(),
            source: std::io::Error::new(ErrorKind::InvalidInput, e.to_string()),
        })?;

        // create_new makes the existence check and the create a single step
        let mut handle = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&absolute)
            .map_err(|source| match source.kind() {
                ErrorKind::AlreadyExists => CreateError::AlreadyExists {
                    path: path.to_string(),
                },
                _ => CreateError::Io {
                    path: path.to_string(),
                    source,
                },
            })?;

        write_or_discard(&absolute, &mut handle, content).map_err(|source| CreateError::Io {
            path: path.to_string(),
            source,
        })?;

        debug!(path, "created file");
        Ok(NoteFile::from_path(path))
    }

    fn process_frontmatter(
        &self,
        file: &NoteFile,
        mutate: &mut dyn FnMut(&mut Frontmatter),
    ) -> Result<()> {
        let absolute = self.absolute(&file.path)?;
        let content = fs::read_to_string(&absolute)?;
        let rewritten = rewrite_frontmatter(&content, mutate)?;
        if rewritten == content {
            return Ok(());
        }

        // Write beside the note, then swap it in
        let mut staging = absolute.clone().into_os_string();
        staging.push(".spawn-tmp");
        replace_via(&PathBuf::from(staging), &absolute, &rewritten)?;
        debug!(path = %file.path, "rewrote frontmatter");
        Ok(())
    }
}

/// Write `content` into a freshly created file, deleting it if the write
/// fails so no partial note is left behind.
fn write_or_discard(absolute: &Path, handle: &mut impl Write, content: &str) -> io::Result<()> {
    let Err(err) = handle.write_all(content.as_bytes()) else {
        return Ok(());
    };
    if let Err(cleanup) = fs::remove_file(absolute) {
        warn!(path = %absolute.display(), error = %cleanup, "could not remove partial note");
    }
    Err(err)
}

/// Write `content` to `staging`, then rename it over `target`.
///
/// The staging file is removed if either step fails.
fn replace_via(staging: &Path, target: &Path, content: &str) -> io::Result<()> {
    let result = fs::write(staging, content).and_then(|()| fs::rename(staging, target));
    if result.is_err() && staging.exists() {
        if let Err(cleanup) = fs::remove_file(staging) {
            warn!(path = %staging.display(), error = %cleanup, "could not remove staging file");
        }
    }
    result
}
