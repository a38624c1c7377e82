//! The terminal as a spawn workspace.
//!
//! Notifications go to stderr. Opening a note launches the configured
//! editor: in the foreground for the active view, detached for a new tab.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use spawn_core::{NoteFile, OpenPlacement, Settings, SpawnError, Workspace};

pub struct TerminalWorkspace {
    root: PathBuf,
    editor: Option<String>,
}

impl TerminalWorkspace {
    /// Resolve the editor from the settings, then `$VISUAL`, then `$EDITOR`.
    pub fn new(root: PathBuf, settings: &Settings) -> Self {
        let editor = settings
            .editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|e| !e.trim().is_empty());
        Self { root, editor }
    }
}

impl Workspace for TerminalWorkspace {
    fn notify(&self, message: &str) {
        eprintln!("spawn: {message}");
    }

    fn open(&self, file: &NoteFile, placement: OpenPlacement) -> spawn_core::Result<()> {
        let Some(editor) = &self.editor else {
            self.notify(&format!(
                "Created {} (no editor configured to open it)",
                file.path
            ));
            return Ok(());
        };

        let mut words = editor.split_whitespace();
        let Some(program) = words.next() else {
            return Ok(());
        };
        let mut command = Command::new(program);
        command.args(words).arg(self.root.join(&file.path));
        debug!(?command, ?placement, "opening note");

        match placement {
            OpenPlacement::ActiveView => {
                let status = command.status()?;
                if !status.success() {
                    return Err(SpawnError::Vault(format!(
                        "editor '{editor}' exited with {status}"
                    )));
                }
            }
            OpenPlacement::NewTab => {
                command
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()?;
            }
        }
        Ok(())
    }
}
