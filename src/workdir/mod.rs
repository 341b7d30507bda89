//! Scoped changes of the working directory.
//!
//! The working directory is process-wide state. Hold a [`TemporaryCd`]
//! only on code paths that no other thread depends on for relative paths.

use std::env;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Result, UtilitiesError};

/// Restores the previous working directory when dropped.
///
/// When created without a target, also owns the scratch directory it moved
/// into, which is deleted after the previous directory is restored.
#[derive(Debug)]
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
pub struct TemporaryCd {
    previous: Option<PathBuf>,
    scratch: Option<TempDir>,
}

impl TemporaryCd {
    /// The scratch directory, when one was created.
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }
}

/// Temporarily move to `directory`.
///
/// - `None` creates a scratch directory, moves into it, and deletes it on drop
/// - `Some("")` leaves the working directory untouched
/// - `Some(path)` moves into `path`
///
/// Either way the original directory is restored when the guard is dropped.
pub fn temporary_cd(directory: Option<&Path>) -> Result<TemporaryCd> {
    if directory.is_some_and(|dir| dir.as_os_str().is_empty()) {
        return Ok(TemporaryCd {
            previous: None,
            scratch: None,
        });
    }

    let previous = env::current_dir()?;

    let (target, scratch) = match directory {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(UtilitiesError::NotADirectory {
                    path: dir.to_path_buf(),
                });
            }
            (dir.to_path_buf(), None)
        }
        None => {
            let scratch = TempDir::new()?;
            (scratch.path().to_path_buf(), Some(scratch))
        }
    };

    env::set_current_dir(&target)?;
    tracing::debug!(
        "Changed directory from {} to {}",
        previous.display(),
        target.display()
    );

    Ok(TemporaryCd {
        previous: Some(previous),
        scratch,
    })
}

/// Run `f` inside `directory`, restoring the working directory afterwards.
pub fn with_temporary_cd<T, F>(directory: Option<&Path>, f: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    let _guard = temporary_cd(directory)?;
    Ok(f())
}

impl Drop for TemporaryCd {
    fn drop(&mut self) {
        if let Some(previous) = &self.previous {
            if let Err(e) = env::set_current_dir(previous) {
                tracing::warn!(
                    "Failed to restore working directory {}: {}",
                    previous.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Tests in this module share the process working directory.
    static CWD_LOCK: Mutex<()> = Mutex::new(());

    fn cwd() -> PathBuf {
        env::current_dir().unwrap().canonicalize().unwrap()
    }

    #[test]
    fn moves_to_parent_and_back() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = cwd();

        {
            let _guard = temporary_cd(Some(Path::new(".."))).unwrap();
            let expected = original.parent().unwrap_or(&original).to_path_buf();
            assert_eq!(cwd(), expected);
        }

        assert_eq!(cwd(), original);
    }

    #[test]
    fn scratch_directory_is_removed() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = cwd();

        let scratch = {
            let guard = temporary_cd(None).unwrap();
            let scratch = guard.scratch_dir().unwrap().canonicalize().unwrap();
            assert_ne!(cwd(), original);
            assert_eq!(cwd(), scratch);
            scratch
        };

        assert_eq!(cwd(), original);
        assert!(!scratch.exists());
    }

    #[test]
    fn empty_path_is_a_no_op() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = cwd();

        let guard = temporary_cd(Some(Path::new(""))).unwrap();
        assert_eq!(cwd(), original);
        assert!(guard.scratch_dir().is_none());
        drop(guard);
        assert_eq!(cwd(), original);
    }

    #[test]
    fn current_directory_round_trips() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = cwd();

        let value = with_temporary_cd(Some(Path::new(".")), cwd).unwrap();
        assert_eq!(value, original);
        assert_eq!(cwd(), original);
    }

    #[test]
    fn missing_directory_is_rejected() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = cwd();

        let err = temporary_cd(Some(Path::new("/nonexistent/dir/for/test"))).unwrap_err();
        assert!(matches!(err, UtilitiesError::NotADirectory { .. }));
        assert_eq!(cwd(), original);
    }

    #[test]
    fn restored_even_when_closure_panics() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = cwd();
        let temp = TempDir::new().unwrap();
        let target = temp.path().to_path_buf();

        let result = std::panic::catch_unwind(|| {
            let _guard = temporary_cd(Some(target.as_path())).unwrap();
            panic!("boom");
        });

        assert!(result.is_err());
        assert_eq!(cwd(), original);
    }
}
