//! Capability probing.
//!
//! This module answers "is this optional piece of functionality present?"
//! for the two kinds of capability the rest of the crate depends on:
//! registered optional modules and executables on the search path.
//!
//! # Modules
//!
//! - [`probe`] - Executable discovery on `PATH`
//! - [`registry`] - Process-wide registry of optional modules

pub mod probe;
pub mod registry;

pub use probe::{
    find_executable, find_executable_with_env, has_executable, has_executable_with_env,
    has_executable_extension, is_executable, parse_search_path, resolve_tool_path,
};
pub use registry::{
    has_package, import_module, probe_module, register_module, registered_modules,
    unregister_module, LicenseCheck, Loader, ModuleError, ModuleRegistry, OptionalModule,
};
