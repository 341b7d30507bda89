//! Error types for openff-utilities operations.
//!
//! This module defines [`UtilitiesError`], the error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Guard failures ([`UtilitiesError::MissingOptionalDependency`]) are always
//!   surfaced to the caller that asked for the dependency check
//! - Version-lookup failures are soft: the getters in [`crate::provenance`]
//!   turn them into `None` plus a warning
//! - Use `anyhow::Error` (via `UtilitiesError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Substring marking module families that ship outside conda-forge.
const NO_INSTALL_HINT_FAMILY: &str = "openeye";

/// Core error type for openff-utilities operations.
#[derive(Debug, Error)]
pub enum UtilitiesError {
    /// An optional dependency is required but is not installed, or is
    /// installed but unlicensed.
    #[error("{}", missing_dependency_message(.library_name, .license_issue))]
    MissingOptionalDependency {
        library_name: String,
        license_issue: bool,
    },

    /// The module was found but failed to load for a reason other than
    /// being absent.
    #[error("The {library_name} module was found but failed to load: {message}")]
    ModuleLoadFailed {
        library_name: String,
        message: String,
    },

    /// The module does not export the license predicate it is expected to.
    #[error("The {library_name} module does not provide the license check {predicate}")]
    UnknownLicensePredicate {
        library_name: String,
        predicate: String,
    },

    /// No conda, mamba, micromamba or pixi executable could be located.
    #[error("No conda/mamba/micromamba executable found. Unable to determine package versions.")]
    CondaExecutableNotFound,

    /// The package-manager listing command could not be run or exited non-zero.
    #[error("Command failed with exit code {code:?}: {command}")]
    ToolInvocationFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The package-manager listing did not have the expected shape.
    #[error("Failed to parse output of `{tool} list` at {line:?}: {message}")]
    ListingParseFailed {
        tool: String,
        line: String,
        message: String,
    },

    /// A directory to change into does not exist.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid configuration file or environment override.
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UtilitiesError {
    /// Build the error raised when an optional dependency cannot be used.
    pub fn missing_dependency(library_name: impl Into<String>, license_issue: bool) -> Self {
        UtilitiesError::MissingOptionalDependency {
            library_name: library_name.into(),
            license_issue,
        }
    }

    /// Name of the missing library, for dependency errors.
    pub fn library_name(&self) -> Option<&str> {
        match self {
            UtilitiesError::MissingOptionalDependency { library_name, .. }
            | UtilitiesError::ModuleLoadFailed { library_name, .. }
            | UtilitiesError::UnknownLicensePredicate { library_name, .. } => Some(library_name),
            _ => None,
        }
    }

    /// Whether the library was importable but unusable due to a missing license.
    pub fn license_issue(&self) -> bool {
        matches!(
            self,
            UtilitiesError::MissingOptionalDependency {
                license_issue: true,
                ..
            }
        )
    }
}

fn missing_dependency_message(library_name: &str, license_issue: &bool) -> String {
    let mut message = format!("The required {} module could not be imported.", library_name);

    if *license_issue {
        message.push_str(" This is due to a missing license.");
    }

    if !library_name.contains(NO_INSTALL_HINT_FAMILY) {
        message.push_str(&format!(
            " Try installing the package by running `conda install -c conda-forge {}`",
            library_name.replace('.', "-")
        ));
    }

    message
}

/// Result type alias for openff-utilities operations.
pub type Result<T> = std::result::Result<T, UtilitiesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dependency_mentions_conda_forge() {
        let err = UtilitiesError::missing_dependency("foobar", false);
        let msg = err.to_string();
        assert!(msg.starts_with("The required foobar module could not be imported."));
        assert!(msg.contains("Try installing"));
        assert!(msg.contains("conda install -c conda-forge foobar"));
    }

    #[test]
    fn install_hint_hyphenates_dotted_names() {
        let err = UtilitiesError::missing_dependency("openff.toolkit", false);
        assert!(err
            .to_string()
            .contains("conda install -c conda-forge openff-toolkit"));
    }

    #[test]
    fn license_issue_appends_explanation() {
        let err = UtilitiesError::missing_dependency("barbaz", true);
        let msg = err.to_string();
        assert!(msg.contains("barbaz"));
        assert!(msg.contains("missing license."));
        assert!(err.license_issue());
    }

    #[test]
    fn openeye_modules_omit_install_hint() {
        for license_issue in [false, true] {
            let err = UtilitiesError::missing_dependency("openeye.oechem", license_issue);
            let msg = err.to_string();
            assert!(msg.contains("oechem"));
            assert!(!msg.contains("conda-forge"));
        }
    }

    #[test]
    fn library_name_accessor() {
        let err = UtilitiesError::missing_dependency("fake-lib", false);
        assert_eq!(err.library_name(), Some("fake-lib"));
        assert!(!err.license_issue());
        assert_eq!(UtilitiesError::CondaExecutableNotFound.library_name(), None);
    }

    #[test]
    fn module_load_failed_displays_reason() {
        let err = UtilitiesError::ModuleLoadFailed {
            library_name: "broken".into(),
            message: "symbol not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("broken"));
        assert!(msg.contains("symbol not found"));
    }

    #[test]
    fn tool_invocation_failed_displays_command_and_code() {
        let err = UtilitiesError::ToolInvocationFailed {
            command: "conda list --json".into(),
            code: Some(2),
            stderr: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("conda list --json"));
        assert!(msg.contains("2"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: UtilitiesError = io_err.into();
        assert!(matches!(err, UtilitiesError::Io(_)));
    }
}
