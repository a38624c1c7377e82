//! Collision-safe note creation.

use tracing::{debug, warn};

use crate::error::{Result, SpawnError};
use crate::increment::next_basename;
use crate::store::{join_path, NoteFile, NoteStore};

/// Upper bound on creation attempts, the first one included.
pub const MAX_CREATE_ATTEMPTS: usize = 100;

/// Create `folder/basename.extension`, stepping the basename past existing
/// files.
///
/// Attempts are strictly sequential: `name`, `name 2`, `name 3`, ... up to
/// [`MAX_CREATE_ATTEMPTS`] in total. Only an "already exists" rejection is
/// retried.
///
/// # Errors
///
/// Returns [`SpawnError::CreationExhausted`] with the last attempted path
/// when every attempt collided, and [`SpawnError::Create`] immediately for
/// any other creation failure.
pub fn create_unique<S: NoteStore + ?Sized>(
    store: &S,
    folder: &[String],
    basename: &str,
    extension: &str,
    content: &str,
) -> Result<NoteFile> {
    let mut candidate = basename.to_string();
    let mut path = join_path(folder, &format!("{candidate}.{extension}"));

    for attempt in 1..=MAX_CREATE_ATTEMPTS {
        if attempt > 1 {
            candidate = next_basename(&candidate);
            path = join_path(folder, &format!("{candidate}.{extension}"));
        }

        debug!(attempt, path = %path, "creating note");
        match store.create(&path, content) {
            Ok(file) => return Ok(file),
            Err(err) if err.is_conflict() => {
                debug!(attempt, path = %path, "name taken, trying next");
            }
            Err(err) => return Err(err.into()),
        }
    }

    warn!(path = %path, attempts = MAX_CREATE_ATTEMPTS, "gave up creating note");
    Err(SpawnError::CreationExhausted {
        last_path: path,
        max_attempts: MAX_CREATE_ATTEMPTS,
    })
}
