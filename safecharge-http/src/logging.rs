//! Per-client, append-only file logging.
//!
//! A client configured with a log path owns its own `tracing` dispatcher so
//! that its records land in that file regardless of the global subscriber.
//! Writes go through a mutex around the file, one record per lock.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::{Dispatch, Level};

/// A `tracing` dispatcher writing plain lines to one file.
#[derive(Clone)]
pub struct FileLog {
    dispatch: Dispatch,
}

impl FileLog {
    /// Opens `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: File) -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_max_level(Level::DEBUG)
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// The dispatcher, for instrumenting futures.
    #[must_use]
    pub const fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Runs `f` with this log as the default subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl std::fmt::Debug for FileLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLog").finish_non_exhaustive()
    }
}
