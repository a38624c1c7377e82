//! # spawn-core
//!
//! Host-independent core for spawning notes from templates.
//!
//! This crate defines everything that does not touch a real file system:
//! - [`Destination`] resolution from template front matter ([`destination`])
//! - Date token substitution and formatting ([`date_token`])
//! - The basename increment rule ([`increment`])
//! - Collision-safe note creation ([`creator`])
//! - Front matter reading and directive stripping ([`frontmatter`])
//! - [`Settings`] and the [`AfterCreation`] behaviour
//! - Host capabilities ([`NoteStore`], [`Workspace`], [`Clock`])
//! - The end-to-end spawn flow ([`TemplateSpawner`])

pub mod clock;
pub mod creator;
pub mod date_token;
pub mod destination;
pub mod error;
pub mod frontmatter;
pub mod increment;
pub mod settings;
pub mod spawner;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use clock::{Clock, FixedClock, SystemClock};
pub use creator::{create_unique, MAX_CREATE_ATTEMPTS};
pub use destination::{Destination, DESTINATION_KEY, DIRECTIVE_KEYS, NAME_KEY, NOTE_EXTENSION};
pub use error::{ConfigError, CreateError, Result, SpawnError};
pub use frontmatter::Frontmatter;
pub use settings::{AfterCreation, Settings};
pub use spawner::{suggest, TemplateSpawner};
pub use store::{NoteFile, NoteFolder, NoteStore, OpenPlacement, Workspace};
