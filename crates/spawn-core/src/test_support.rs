//! In-memory host doubles for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CreateError, Result, SpawnError};
use crate::frontmatter::{rewrite_frontmatter, Frontmatter};
use crate::store::{NoteFile, NoteFolder, NoteStore, OpenPlacement, Workspace};

#[derive(Default)]
pub struct MemoryStore {
    files: RefCell<BTreeMap<String, String>>,
    folders: RefCell<BTreeSet<String>>,
    create_calls: Cell<usize>,
    fail_creates: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_folder(self, path: &str) -> Self {
        self.folders.borrow_mut().insert(path.to_string());
        self
    }

    pub fn failing_creates(mut self) -> Self {
        self.fail_creates = true;
        self
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.get()
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.folders.borrow().contains(path)
    }
}

impl NoteStore for MemoryStore {
    fn folder(&self, path: &str) -> Option<NoteFolder> {
        let prefix = format!("{path}/");
        let exists = path.is_empty()
            || self.folders.borrow().contains(path)
            || self.files.borrow().keys().any(|p| p.starts_with(&prefix));
        exists.then(|| NoteFolder {
            path: path.to_string(),
        })
    }

    fn list_files(&self, folder: &NoteFolder) -> Result<Vec<NoteFile>> {
        Ok(self
            .files
            .borrow()
            .keys()
            .map(|p| NoteFile::from_path(p.as_str()))
            .filter(|f| f.parent() == folder.path)
            .collect())
    }

    fn read(&self, file: &NoteFile) -> Result<String> {
        self.contents(&file.path)
            .ok_or_else(|| SpawnError::Vault(format!("no such file: {}", file.path)))
    }

    fn ensure_folder(&self, path: &str) -> Result<()> {
        if !path.is_empty() {
            self.folders.borrow_mut().insert(path.to_string());
        }
        Ok(())
    }

    fn create(&self, path: &str, content: &str) -> std::result::Result<NoteFile, CreateError> {
        self.create_calls.set(self.create_calls.get() + 1);
        if self.files.borrow().contains_key(path) {
            return Err(CreateError::AlreadyExists {
                path: path.to_string(),
            });
        }
        if self.fail_creates {
            return Err(CreateError::Io {
                path: path.to_string(),
                source: std::io::Error::other("read-only vault"),
            });
        }
        self.files
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        Ok(NoteFile::from_path(path))
    }

    fn process_frontmatter(
        &self,
        file: &NoteFile,
        mutate: &mut dyn FnMut(&mut Frontmatter),
    ) -> Result<()> {
        let content = self.read(file)?;
        let rewritten = rewrite_frontmatter(&content, mutate)?;
        self.files.borrow_mut().insert(file.path.clone(), rewritten);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingWorkspace {
    pub notices: RefCell<Vec<String>>,
    pub opened: RefCell<Vec<(String, OpenPlacement)>>,
}

impl Workspace for RecordingWorkspace {
    fn notify(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }

    fn open(&self, file: &NoteFile, placement: OpenPlacement) -> Result<()> {
        self.opened
            .borrow_mut()
            .push((file.path.clone(), placement));
        Ok(())
    }
}
