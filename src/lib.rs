//! openff-utilities - Optional-dependency probing and package-version lookup.
//!
//! Scientific toolkits often depend on heavy optional components: licensed
//! toolkits, external executables, packages installed through a conda-style
//! package manager. This crate answers three questions about them:
//!
//! - Is a module or executable available? ([`capability`])
//! - May this operation run? ([`guard`])
//! - Which version of a package is installed? ([`provenance`])
//!
//! # Modules
//!
//! - [`capability`] - Optional module registry and executable probing
//! - [`cli`] - Command-line interface for the diagnostic binary
//! - [`config`] - Version oracle settings (YAML file and env overrides)
//! - [`error`] - Error types and result aliases
//! - [`guard`] - Dependency guards for operations
//! - [`provenance`] - Package-manager discovery and version tables
//! - [`workdir`] - Scoped working-directory changes
//!
//! # Example
//!
//! ```
//! use openff_utilities::{has_executable, has_package, register_module, OptionalModule};
//!
//! assert!(has_package("std"));
//! assert!(!has_package("nummmmmmpy"));
//! assert!(!has_executable("pyyyyython"));
//!
//! register_module(OptionalModule::new("doc_example.toolkit"));
//! assert!(has_package("doc_example"));
//! ```

pub mod capability;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod provenance;
pub mod workdir;

pub use capability::{
    has_executable, has_package, import_module, register_module, unregister_module,
    ModuleError, OptionalModule,
};
pub use config::OracleConfig;
pub use error::{Result, UtilitiesError};
pub use guard::{requires_oe_module, requires_package, Guarded, OeModule, Requirement};
pub use provenance::{
    get_ambertools_version, get_package_version, package_versions,
    reset_package_version_cache, VersionOracle, VersionTable,
};
pub use workdir::{temporary_cd, with_temporary_cd, TemporaryCd};
