//! spawn CLI: new notes from vault templates
//!
//! Commands: init, list, new, config, completions

mod terminal;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use serde::Serialize;

use spawn_core::{
    suggest, AfterCreation, Clock, FixedClock, NoteFile, NoteStore, Settings, SystemClock,
    TemplateSpawner,
};
use spawn_vault::{FsVault, SettingsFile};

use crate::terminal::TerminalWorkspace;

#[derive(Parser)]
#[command(name = "spawn")]
#[command(version)]
#[command(about = "Spawn new notes from vault templates")]
struct Cli {
    /// Vault root directory
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Log diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Initialize a vault for spawning
    Init,
    /// List templates whose name contains QUERY
    #[command(alias = "ls")]
    List { query: Option<String> },
    /// Create a new note from a template
    New {
        /// Template name, or part of it
        template: String,
        /// Override the after-creation behaviour
        #[arg(long)]
        after: Option<AfterCreation>,
        /// Pretend today is this date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Print a shell completion script
    Completions { shell: Shell },
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Print the current settings
    Show,
    /// Folder holding templates, relative to the vault root
    SetTemplateFolder { path: String },
    /// do-nothing, open-active, or open-new-tab
    SetAfterCreation { mode: AfterCreation },
    /// Command used to open notes
    SetEditor { command: String },
}

#[derive(Serialize)]
struct TemplateEntry<'a> {
    basename: &'a str,
    path: &'a str,
}

#[derive(Serialize)]
struct SpawnedNote<'a> {
    path: &'a str,
    template: &'a str,
    after_creation: AfterCreation,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init) => init(&cli.vault),
        Some(Commands::List { query }) => list(&cli.vault, query.as_deref()),
        Some(Commands::New {
            template,
            after,
            date,
        }) => new_note(&cli.vault, &template, after, date.as_deref()),
        Some(Commands::Config { action }) => {
            config(&cli.vault, action.unwrap_or(ConfigAction::Show))
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "spawn", &mut io::stdout());
            Ok(())
        }
        None => {
            println!(
                "spawn v{}: new notes from vault templates",
                env!("CARGO_PKG_VERSION")
            );
            println!("Run `spawn --help` for usage.");
            Ok(())
        }
    }
}

fn init(root: &Path) -> Result<()> {
    let vault = FsVault::open(root)?;
    let settings_file = SettingsFile::for_vault(root);
    let settings = settings_file.load()?;
    if !settings_file.exists() {
        settings_file.save(&settings)?;
    }
    vault
        .ensure_folder(settings.template_folder_path())
        .context("creating template folder")?;
    println!("Initialized spawn vault at {}", root.display());
    Ok(())
}

fn list(root: &Path, query: Option<&str>) -> Result<()> {
    let vault = FsVault::open(root)?;
    let settings = SettingsFile::for_vault(root).load()?;
    let workspace = TerminalWorkspace::new(root.to_path_buf(), &settings);
    let spawner = TemplateSpawner::new(&vault, &workspace, &SystemClock, &settings);

    let templates = spawner.templates()?;
    let entries: Vec<TemplateEntry<'_>> = suggest(&templates, query.unwrap_or(""))
        .into_iter()
        .map(|t| TemplateEntry {
            basename: &t.basename,
            path: &t.path,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn new_note(
    root: &Path,
    query: &str,
    after: Option<AfterCreation>,
    date: Option<&str>,
) -> Result<()> {
    let vault = FsVault::open(root)?;
    let settings = SettingsFile::for_vault(root).load()?;
    let workspace = TerminalWorkspace::new(root.to_path_buf(), &settings);
    let clock: Box<dyn Clock> = match date {
        Some(text) => Box::new(FixedClock(parse_moment(text)?)),
        None => Box::new(SystemClock),
    };
    let spawner = TemplateSpawner::new(&vault, &workspace, clock.as_ref(), &settings);

    let templates = spawner.templates()?;
    let template = choose_template(&templates, query)?;
    let after = after.unwrap_or(settings.after_creation);
    let file = spawner
        .spawn_with(template, after)
        .with_context(|| format!("spawning from {}", template.path))?;

    let output = SpawnedNote {
        path: &file.path,
        template: &template.path,
        after_creation: after,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// An exact (case-insensitive) name wins; otherwise the query must match
/// exactly one template.
fn choose_template<'t>(templates: &'t [NoteFile], query: &str) -> Result<&'t NoteFile> {
    if let Some(exact) = templates
        .iter()
        .find(|t| t.basename.to_lowercase() == query.to_lowercase())
    {
        return Ok(exact);
    }

    match suggest(templates, query).as_slice() {
        [] => bail!("no template matches '{query}'"),
        [only] => Ok(*only),
        several => {
            let names: Vec<&str> = several.iter().map(|t| t.basename.as_str()).collect();
            bail!("'{query}' matches several templates: {}", names.join(", "))
        }
    }
}

fn parse_moment(text: &str) -> Result<NaiveDateTime> {
    if let Ok(moment) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Ok(moment);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .with_context(|| format!("invalid date '{text}', expected YYYY-MM-DD"))
}

fn config(root: &Path, action: ConfigAction) -> Result<()> {
    let settings_file = SettingsFile::for_vault(root);
    let settings = match action {
        ConfigAction::Show => settings_file.load()?,
        ConfigAction::SetTemplateFolder { path } => {
            settings_file.update(|s| s.template_folder = path)?
        }
        ConfigAction::SetAfterCreation { mode } => {
            settings_file.update(|s| s.after_creation = mode)?
        }
        ConfigAction::SetEditor { command } => {
            settings_file.update(|s| s.editor = Some(command))?
        }
    };
    print_settings(&settings)
}

fn print_settings(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&settings.to_stored()?)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> Vec<NoteFile> {
        ["Daily", "Daily Review", "Meeting"]
            .iter()
            .map(|n| NoteFile::from_path(format!("templates/{n}.md")))
            .collect()
    }

    #[test]
    fn exact_name_beats_substring_matches() {
        let templates = templates();
        let chosen = choose_template(&templates, "daily").unwrap();
        assert_eq!(chosen.basename, "Daily");
    }

    #[test]
    fn single_substring_match_is_chosen() {
        let templates = templates();
        assert_eq!(choose_template(&templates, "meet").unwrap().basename, "Meeting");
    }

    #[test]
    fn ambiguous_or_missing_matches_fail() {
        let templates = templates();
        let err = choose_template(&templates, "dai").unwrap_err().to_string();
        assert!(err.contains("Daily, Daily Review"), "{err}");
        assert!(choose_template(&templates, "zzz").is_err());
    }

    #[test]
    fn parse_moment_accepts_date_and_datetime() {
        let day = parse_moment("2024-03-07").unwrap();
        assert_eq!(day.to_string(), "2024-03-07 00:00:00");
        let moment = parse_moment("2024-03-07T08:30:00").unwrap();
        assert_eq!(moment.to_string(), "2024-03-07 08:30:00");
        assert!(parse_moment("07/03/2024").is_err());
    }
}
