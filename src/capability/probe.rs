//! Executable discovery on the search path.
//!
//! Lookups walk the `PATH` entries directly instead of shelling out to
//! `which`, whose behavior varies across systems and is sometimes a shell
//! builtin with inconsistent error handling.
//!
//! # Example
//!
//! ```
//! use openff_utilities::capability::has_executable;
//!
//! assert!(!has_executable("definitely-not-a-real-tool-name"));
//! ```

use std::env::VarError;
use std::path::{Path, PathBuf};

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Without permission bits, a file is executable when its extension is
/// listed in `PATHEXT`.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    let pathext = std::env::var("PATHEXT").unwrap_or_else(|_| DEFAULT_PATHEXT.to_string());
    has_executable_extension(path, &pathext)
}

/// `PATHEXT` value assumed when the variable is unset.
#[cfg(not(unix))]
const DEFAULT_PATHEXT: &str = ".COM;.EXE;.BAT;.CMD";

/// Whether the extension of `path` appears in a `;`-separated `PATHEXT` list.
///
/// Matching ignores case. A path without an extension never matches.
pub fn has_executable_extension(path: &Path, pathext: &str) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    pathext
        .split(';')
        .map(|entry| entry.trim().trim_start_matches('.'))
        .filter(|entry| !entry.is_empty())
        .any(|entry| entry.eq_ignore_ascii_case(ext))
}

/// Whether `path` is a regular file that may be executed.
fn is_executable_file(path: &Path) -> bool {
    path.is_file() && is_executable(path)
}

/// Split a search-path value into directories.
///
/// Surrounding double quotes are trimmed from each entry, as some
/// installers write quoted entries into `PATH` on Windows.
pub fn parse_search_path(value: &str) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter_map(|entry| {
            let entry = entry.to_string_lossy();
            let trimmed = entry.trim_matches('"');
            if trimmed.is_empty() {
                None
            } else {
                Some(PathBuf::from(trimmed))
            }
        })
        .collect()
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that is a regular, executable file.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    path_entries
        .iter()
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable_file(candidate))
}

/// Whether `program` names a path rather than a bare executable name.
fn has_directory_component(program: &str) -> bool {
    Path::new(program)
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty())
}

/// Locate an executable, returning its full path.
///
/// A name containing a directory separator is checked as given; a bare
/// name is searched for on the search path returned by `env_fn("PATH")`.
pub fn find_executable_with_env<F>(program: &str, env_fn: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    if has_directory_component(program) {
        let path = PathBuf::from(program);
        return is_executable_file(&path).then_some(path);
    }

    let entries = env_fn("PATH")
        .map(|value| parse_search_path(&value))
        .unwrap_or_default();
    resolve_tool_path(program, &entries)
}

/// Locate an executable using the process environment.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    find_executable_with_env(program, |key| std::env::var(key))
}

/// Whether an executable is available, using a custom env var lookup.
///
/// This allows testing without modifying actual environment variables.
pub fn has_executable_with_env<F>(program: &str, env_fn: F) -> bool
where
    F: Fn(&str) -> Result<String, VarError>,
{
    find_executable_with_env(program, env_fn).is_some()
}

/// Whether an executable is available by path or on the search path.
pub fn has_executable(program: &str) -> bool {
    find_executable(program).is_some()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    /// Create a fake binary at a path (creates parent dirs as needed).
    pub fn create_fake_binary(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    /// Create a non-executable file at a path.
    #[cfg(unix)]
    pub fn create_non_executable_file(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "not executable").unwrap();
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
