//! # spawn-vault
//!
//! File system operations for a spawn vault.
//!
//! The vault is a plain directory of markdown notes. [`FsVault`] exposes it
//! to the spawn flow through [`spawn_core::NoteStore`], and
//! [`SettingsFile`] persists [`spawn_core::Settings`] under `.spawn/`.

pub mod settings_file;
pub mod vault;

pub use settings_file::SettingsFile;
pub use vault::FsVault;
