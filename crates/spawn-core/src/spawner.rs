//! The spawn flow: template folder lookup, destination resolution,
//! collision-safe creation, directive stripping, and placement.

use tracing::{debug, info};

use crate::clock::Clock;
use crate::creator::create_unique;
use crate::destination::{Destination, DIRECTIVE_KEYS, NOTE_EXTENSION};
use crate::error::{ConfigError, Result, SpawnError};
use crate::frontmatter::Frontmatter;
use crate::settings::{AfterCreation, Settings};
use crate::store::{NoteFile, NoteStore, Workspace};

/// Spawns notes from the templates in the configured folder.
pub struct TemplateSpawner<'a> {
    store: &'a dyn NoteStore,
    workspace: &'a dyn Workspace,
    clock: &'a dyn Clock,
    settings: &'a Settings,
}

impl<'a> TemplateSpawner<'a> {
    #[must_use]
    pub fn new(
        store: &'a dyn NoteStore,
        workspace: &'a dyn Workspace,
        clock: &'a dyn Clock,
        settings: &'a Settings,
    ) -> Self {
        Self {
            store,
            workspace,
            clock,
            settings,
        }
    }

    /// Markdown files directly inside the template folder.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TemplateFolderNotFound`] after notifying the
    /// user when the folder does not exist.
    pub fn templates(&self) -> Result<Vec<NoteFile>> {
        let path = self.settings.template_folder_path();
        let Some(folder) = self.store.folder(path) else {
            let err = ConfigError::TemplateFolderNotFound {
                path: self.settings.template_folder.clone(),
            };
            self.workspace.notify(&err.to_string());
            return Err(err.into());
        };

        Ok(self
            .store
            .list_files(&folder)?
            .into_iter()
            .filter(|file| file.extension == NOTE_EXTENSION)
            .collect())
    }

    /// Spawn a note from `template` and handle it as the settings say.
    ///
    /// # Errors
    ///
    /// See [`TemplateSpawner::spawn_with`].
    pub fn spawn(&self, template: &NoteFile) -> Result<NoteFile> {
        self.spawn_with(template, self.settings.after_creation)
    }

    /// Spawn a note from `template`, then apply `after`.
    ///
    /// The note is created with the full template text; the directive keys
    /// are stripped only once it exists.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::CreationExhausted`] after notifying the user
    /// when every candidate name was taken. Store failures propagate as-is.
    pub fn spawn_with(&self, template: &NoteFile, after: AfterCreation) -> Result<NoteFile> {
        let content = self.store.read(template)?;
        let frontmatter = Frontmatter::from_document(&content)?;
        let destination =
            Destination::resolve(frontmatter.as_ref(), &template.basename, self.clock);
        debug!(
            template = %template.path,
            folder = %destination.folder_path(),
            basename = %destination.basename,
            "resolved destination"
        );

        self.store.ensure_folder(&destination.folder_path())?;
        let file = match create_unique(
            self.store,
            &destination.folder,
            &destination.basename,
            NOTE_EXTENSION,
            &content,
        ) {
            Ok(file) => file,
            Err(SpawnError::CreationExhausted {
                last_path,
                max_attempts,
            }) => {
                self.workspace.notify(&format!(
                    "Could not create {last_path} after {max_attempts} attempts."
                ));
                return Err(SpawnError::CreationExhausted {
                    last_path,
                    max_attempts,
                });
            }
            Err(err) => return Err(err),
        };

        strip_directives(self.store, &file)?;
        info!(template = %template.path, note = %file.path, "spawned note");

        place(self.workspace, &file, after)?;
        Ok(file)
    }
}

/// Templates whose basename contains `query`, ignoring case.
#[must_use]
pub fn suggest<'t>(templates: &'t [NoteFile], query: &str) -> Vec<&'t NoteFile> {
    let query = query.to_lowercase();
    templates
        .iter()
        .filter(|template| template.basename.to_lowercase().contains(&query))
        .collect()
}

/// Remove both directive keys from `file`. Safe to call when they are absent.
///
/// # Errors
///
/// Propagates store failures.
pub fn strip_directives(store: &dyn NoteStore, file: &NoteFile) -> Result<()> {
    store.process_frontmatter(file, &mut |frontmatter| {
        for key in DIRECTIVE_KEYS {
            frontmatter.remove(key);
        }
    })
}

/// Leave, or open, a freshly created note.
///
/// # Errors
///
/// Propagates failures from [`Workspace::open`].
pub fn place(workspace: &dyn Workspace, file: &NoteFile, after: AfterCreation) -> Result<()> {
    match after.placement() {
        None => {
            workspace.notify(&format!("Created {}", file.path));
            Ok(())
        }
        Some(placement) => workspace.open(file, placement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::creator::MAX_CREATE_ATTEMPTS;
    use crate::store::OpenPlacement;
    use crate::test_support::{MemoryStore, RecordingWorkspace};

    const DAILY: &str =
        "---\nspawn-destination: \"Logs\"\nspawn-name: \"{{date}}\"\ntags: [daily]\n---\n# {{date}}\n";

    fn march_7() -> FixedClock {
        FixedClock::on_date(2024, 3, 7).unwrap()
    }

    #[test]
    fn spawns_daily_note_into_destination() {
        let store = MemoryStore::new().with_file("templates/Daily.md", DAILY);
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings::default();
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);

        let template = NoteFile::from_path("templates/Daily.md");
        let file = spawner.spawn(&template).unwrap();

        assert_eq!(file.path, "Logs/2024-03-07.md");
        let written = store.contents("Logs/2024-03-07.md").unwrap();
        assert_eq!(written, "---\ntags: [daily]\n---\n# {{date}}\n");
        assert!(store.has_folder("Logs"));
        // The template itself is untouched.
        assert_eq!(store.contents("templates/Daily.md").as_deref(), Some(DAILY));
        assert_eq!(workspace.notices.borrow().as_slice(), ["Created Logs/2024-03-07.md"]);
    }

    #[test]
    fn second_spawn_on_same_day_gets_numbered() {
        let store = MemoryStore::new().with_file("templates/Daily.md", DAILY);
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings::default();
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);
        let template = NoteFile::from_path("templates/Daily.md");

        spawner.spawn(&template).unwrap();
        let second = spawner.spawn(&template).unwrap();
        assert_eq!(second.path, "Logs/2024-03-07 2.md");
    }

    #[test]
    fn template_without_frontmatter_is_copied_to_root() {
        let store = MemoryStore::new().with_file("templates/Inbox.md", "- [ ] triage\n");
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings::default();
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);

        let file = spawner
            .spawn(&NoteFile::from_path("templates/Inbox.md"))
            .unwrap();
        assert_eq!(file.path, "Inbox.md");
        assert_eq!(store.contents("Inbox.md").as_deref(), Some("- [ ] triage\n"));
    }

    #[test]
    fn other_frontmatter_keys_survive() {
        let template =
            "---\ntitle: Weekly\nspawn-name: \"Week {{date:WW}}\"\nstatus: open\n---\nBody\n";
        let store = MemoryStore::new().with_file("templates/Weekly.md", template);
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings::default();
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);

        let file = spawner
            .spawn(&NoteFile::from_path("templates/Weekly.md"))
            .unwrap();
        assert_eq!(file.path, "Week 10.md");

        let fm = store.read_frontmatter(&file).unwrap().unwrap();
        assert!(!fm.contains_key("spawn-name"));
        assert!(!fm.contains_key("spawn-destination"));
        assert_eq!(fm.get_str("title").as_deref(), Some("Weekly"));
        assert_eq!(fm.get_str("status").as_deref(), Some("open"));
    }

    #[test]
    fn exhausted_creation_notifies_then_fails() {
        let mut store = MemoryStore::new()
            .with_file("templates/Daily.md", DAILY)
            .with_file("Logs/2024-03-07.md", "");
        for n in 2..=MAX_CREATE_ATTEMPTS {
            store = store.with_file(&format!("Logs/2024-03-07 {n}.md"), "");
        }
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings::default();
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);

        let err = spawner
            .spawn(&NoteFile::from_path("templates/Daily.md"))
            .unwrap_err();
        assert!(matches!(err, SpawnError::CreationExhausted { .. }));
        assert_eq!(
            workspace.notices.borrow().as_slice(),
            ["Could not create Logs/2024-03-07 100.md after 100 attempts."]
        );
        assert!(workspace.opened.borrow().is_empty());
    }

    #[test]
    fn unclassified_failure_propagates_without_notice() {
        let store = MemoryStore::new()
            .with_file("templates/Daily.md", DAILY)
            .failing_creates();
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings::default();
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);

        let err = spawner
            .spawn(&NoteFile::from_path("templates/Daily.md"))
            .unwrap_err();
        assert!(matches!(err, SpawnError::Create(_)));
        assert!(workspace.notices.borrow().is_empty());
    }

    #[test]
    fn placement_follows_after_creation() {
        let store = MemoryStore::new().with_file("templates/Daily.md", DAILY);
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings {
            after_creation: AfterCreation::OpenNewTab,
            ..Settings::default()
        };
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);
        let template = NoteFile::from_path("templates/Daily.md");

        spawner.spawn(&template).unwrap();
        spawner.spawn_with(&template, AfterCreation::OpenActive).unwrap();

        assert_eq!(
            workspace.opened.borrow().as_slice(),
            [
                ("Logs/2024-03-07.md".to_string(), OpenPlacement::NewTab),
                ("Logs/2024-03-07 2.md".to_string(), OpenPlacement::ActiveView),
            ]
        );
        assert!(workspace.notices.borrow().is_empty());
    }

    #[test]
    fn templates_lists_markdown_files_only() {
        let store = MemoryStore::new()
            .with_file("templates/Daily.md", DAILY)
            .with_file("templates/Meeting.md", "")
            .with_file("templates/logo.png", "")
            .with_file("templates/archive/Old.md", "")
            .with_file("Other.md", "");
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings::default();
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);

        let names: Vec<String> = spawner
            .templates()
            .unwrap()
            .into_iter()
            .map(|t| t.basename)
            .collect();
        assert_eq!(names, ["Daily", "Meeting"]);
    }

    #[test]
    fn empty_template_folder_lists_nothing() {
        let store = MemoryStore::new().with_folder("templates");
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings::default();
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);
        assert!(spawner.templates().unwrap().is_empty());
    }

    #[test]
    fn missing_template_folder_notifies() {
        let store = MemoryStore::new();
        let workspace = RecordingWorkspace::default();
        let clock = march_7();
        let settings = Settings {
            template_folder: "tpl".to_string(),
            ..Settings::default()
        };
        let spawner = TemplateSpawner::new(&store, &workspace, &clock, &settings);

        let err = spawner.templates().unwrap_err();
        assert!(matches!(
            err,
            SpawnError::Config(ConfigError::TemplateFolderNotFound { .. })
        ));
        assert_eq!(
            workspace.notices.borrow().as_slice(),
            ["Could not find the template folder at tpl. Please update the settings."]
        );
    }

    #[test]
    fn suggest_matches_substrings_ignoring_case() {
        let templates = vec![
            NoteFile::from_path("templates/Daily.md"),
            NoteFile::from_path("templates/Meeting.md"),
            NoteFile::from_path("templates/daily review.md"),
        ];
        let hits: Vec<&str> = suggest(&templates, "DAIL")
            .into_iter()
            .map(|t| t.basename.as_str())
            .collect();
        assert_eq!(hits, ["Daily", "daily review"]);
        assert_eq!(suggest(&templates, "").len(), 3);
        assert!(suggest(&templates, "zzz").is_empty());
    }

    #[test]
    fn strip_directives_is_idempotent() {
        let store = MemoryStore::new().with_file("a.md", "---\nkeep: 1\n---\nx");
        let file = NoteFile::from_path("a.md");
        strip_directives(&store, &file).unwrap();
        strip_directives(&store, &file).unwrap();
        assert_eq!(store.contents("a.md").as_deref(), Some("---\nkeep: 1\n---\nx"));
    }
}
