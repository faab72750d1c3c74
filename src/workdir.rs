//! Scoped change of the process working directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{BionicError, Result};

/// Changes into a directory and changes back when dropped.
///
/// The previous directory is restored on every exit path, including early returns through `?`
/// and unwinding panics.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
    current: PathBuf,
}

impl WorkingDirGuard {
    /// Creates `dir` if needed and makes it the working directory.
    pub fn enter(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let io_error = |source| BionicError::WorkingDir {
            path: dir.to_path_buf(),
            source,
        };

        let previous = env::current_dir().map_err(io_error)?;
        fs::create_dir_all(dir).map_err(io_error)?;
        env::set_current_dir(dir).map_err(io_error)?;
        let current = env::current_dir().map_err(io_error)?;
        debug!("Entered {}", current.display());

        Ok(Self { previous, current })
    }

    /// Directory that was current before [`WorkingDirGuard::enter`].
    pub fn previous(&self) -> &Path {
        &self.previous
    }

    /// Directory entered by the guard.
    pub fn current(&self) -> &Path {
        &self.current
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        match env::set_current_dir(&self.previous) {
            Ok(()) => debug!("Returned to {}", self.previous.display()),
            Err(err) => warn!(
                "Failed to return to {}: {}",
                self.previous.display(),
                err
            ),
        }
    }
}
