//! Destination resolution from template frontmatter.
//!
//! Two directive keys steer where a spawned note lands:
//! - `spawn-destination`: `/`-separated folder path, relative to the vault root
//! - `spawn-name`: basename of the new note, may contain date tokens
//!
//! Both are removed from the note after it has been created.

use chrono::NaiveDateTime;

use crate::clock::Clock;
use crate::date_token;
use crate::frontmatter::Frontmatter;
use crate::store::join_path;

/// Frontmatter key naming the destination folder.
pub const DESTINATION_KEY: &str = "spawn-destination";

/// Frontmatter key naming the new note.
pub const NAME_KEY: &str = "spawn-name";

/// Both directive keys, in the order they are stripped.
pub const DIRECTIVE_KEYS: [&str; 2] = [DESTINATION_KEY, NAME_KEY];

/// Extension of every spawned note.
pub const NOTE_EXTENSION: &str = "md";

/// Where a new note should be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Folder segments below the vault root; empty for the root itself.
    pub folder: Vec<String>,
    /// File name without extension.
    pub basename: String,
}

impl Destination {
    /// Resolve a template's destination against a single clock reading.
    #[must_use]
    pub fn resolve(
        frontmatter: Option<&Frontmatter>,
        template_basename: &str,
        clock: &dyn Clock,
    ) -> Self {
        let now = clock.now();
        Self {
            folder: resolve_folder(frontmatter),
            basename: resolve_basename(frontmatter, template_basename, &now),
        }
    }

    /// Vault-relative folder path.
    #[must_use]
    pub fn folder_path(&self) -> String {
        self.folder.join("/")
    }

    /// Vault-relative path of the note with `extension`.
    #[must_use]
    pub fn path(&self, extension: &str) -> String {
        join_path(&self.folder, &format!("{}.{extension}", self.basename))
    }
}

/// Folder segments named by the destination directive.
///
/// Empty and whitespace-only segments are discarded, so an absent, empty,
/// or all-slash directive means the vault root.
#[must_use]
pub fn resolve_folder(frontmatter: Option<&Frontmatter>) -> Vec<String> {
    frontmatter
        .and_then(|fm| fm.get_str(DESTINATION_KEY))
        .map(|directive| split_segments(&directive))
        .unwrap_or_default()
}

fn split_segments(directive: &str) -> Vec<String> {
    directive
        .split('/')
        .filter(|segment| !segment.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Basename named by the name directive, with date tokens rendered at `now`.
///
/// Falls back to the template's own basename when the directive is absent.
#[must_use]
pub fn resolve_basename(
    frontmatter: Option<&Frontmatter>,
    template_basename: &str,
    now: &NaiveDateTime,
) -> String {
    match frontmatter.and_then(|fm| fm.get_str(NAME_KEY)) {
        Some(directive) => date_token::substitute(&directive, now),
        None => template_basename.to_string(),
    }
}
