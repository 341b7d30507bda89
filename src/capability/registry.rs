//! Registry of optional modules available to the current process.
//!
//! Rust has no reflective import, so optional functionality is modelled
//! as named modules registered at startup (typically by the crate that
//! links the optional backend). A module may carry a loader, run on every
//! resolution, and named license checks used by licensed toolkits.
//!
//! Dotted names follow package semantics: registering `openeye.oechem`
//! makes the `openeye` namespace resolvable too.
//!
//! # Example
//!
//! ```
//! use openff_utilities::capability::{has_package, register_module, OptionalModule};
//!
//! assert!(has_package("openff.utilities"));
//! assert!(!has_package("nummmmmmpy"));
//!
//! register_module(OptionalModule::new("example.backend"));
//! assert!(has_package("example.backend"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::error::{Result, UtilitiesError};

/// Why a module could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// Nothing by this name is installed.
    NotFound,
    /// The module exists but its loader failed.
    Failed(String),
}

/// Loader run whenever a module is resolved.
pub type Loader = Arc<dyn Fn() -> std::result::Result<(), ModuleError> + Send + Sync>;

/// A named license predicate exported by a module.
pub type LicenseCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// An optional module that can be registered with the process.
#[derive(Clone)]
pub struct OptionalModule {
    name: String,
    loader: Option<Loader>,
    license_checks: HashMap<String, LicenseCheck>,
}

impl OptionalModule {
    /// A module that always loads successfully.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loader: None,
            license_checks: HashMap::new(),
        }
    }

    /// Attach a loader, run on each resolution.
    pub fn with_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn() -> std::result::Result<(), ModuleError> + Send + Sync + 'static,
    {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Export a named license predicate.
    pub fn with_license_check<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.license_checks.insert(name.into(), Arc::new(check));
        self
    }

    /// The module's dotted name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the loader, if any.
    pub fn load(&self) -> std::result::Result<(), ModuleError> {
        match &self.loader {
            Some(loader) => loader(),
            None => Ok(()),
        }
    }

    /// Look up an exported license predicate by name.
    pub fn license_check(&self, name: &str) -> Option<LicenseCheck> {
        self.license_checks.get(name).cloned()
    }
}

impl fmt::Debug for OptionalModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut checks: Vec<&String> = self.license_checks.keys().collect();
        checks.sort();
        f.debug_struct("OptionalModule")
            .field("name", &self.name)
            .field("has_loader", &self.loader.is_some())
            .field("license_checks", &checks)
            .finish()
    }
}

/// Modules that are part of every process using this crate.
const BUILTIN_MODULES: &[&str] = &[
    "std",
    "core",
    "alloc",
    "openff.utilities",
    "openff.utilities.capability",
    "openff.utilities.cli",
    "openff.utilities.config",
    "openff.utilities.error",
    "openff.utilities.guard",
    "openff.utilities.provenance",
    "openff.utilities.workdir",
];

/// Registry of all known optional modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, OptionalModule>,
}

impl ModuleRegistry {
    /// Create a registry with the built-in modules.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for name in BUILTIN_MODULES {
            registry.register(OptionalModule::new(*name));
        }
        registry
    }

    /// Create a registry with nothing registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a module, replacing any previous module of the same name.
    pub fn register(&mut self, module: OptionalModule) {
        self.modules.insert(module.name.clone(), module);
    }

    /// Remove a module from the registry.
    pub fn unregister(&mut self, name: &str) -> Option<OptionalModule> {
        self.modules.remove(name)
    }

    /// Get a registered module by exact name.
    pub fn get(&self, name: &str) -> Option<&OptionalModule> {
        self.modules.get(name)
    }

    /// Whether `name` is a namespace containing registered modules.
    fn is_namespace(&self, name: &str) -> bool {
        let prefix = format!("{}.", name);
        self.modules.keys().any(|key| key.starts_with(&prefix))
    }

    /// Find the module or namespace for `name` without loading it.
    pub fn lookup(&self, name: &str) -> std::result::Result<OptionalModule, ModuleError> {
        if let Some(module) = self.modules.get(name) {
            return Ok(module.clone());
        }
        if !name.is_empty() && self.is_namespace(name) {
            return Ok(OptionalModule::new(name));
        }
        Err(ModuleError::NotFound)
    }

    /// Sorted names of all registered modules.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

static REGISTRY: LazyLock<RwLock<ModuleRegistry>> =
    LazyLock::new(|| RwLock::new(ModuleRegistry::new()));

/// Register a module with the process-wide registry.
pub fn register_module(module: OptionalModule) {
    tracing::debug!("Registering optional module {}", module.name());
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(module);
}

/// Remove a module from the process-wide registry.
pub fn unregister_module(name: &str) -> Option<OptionalModule> {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .unregister(name)
}

/// Sorted names of the modules in the process-wide registry.
pub fn registered_modules() -> Vec<String> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .names()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Resolve and load a module from the process-wide registry.
///
/// The registry lock is released before the loader runs, so loaders may
/// register further modules.
pub fn import_module(name: &str) -> std::result::Result<OptionalModule, ModuleError> {
    let module = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .lookup(name)?;
    module.load()?;
    Ok(module)
}

/// Probe a module, distinguishing "not installed" from a broken install.
///
/// Returns `Ok(false)` only when the module is not found. A module that is
/// found but fails to load is reported as [`UtilitiesError::ModuleLoadFailed`].
pub fn probe_module(name: &str) -> Result<bool> {
    match import_module(name) {
        Ok(_) => Ok(true),
        Err(ModuleError::NotFound) => Ok(false),
        Err(ModuleError::Failed(message)) => Err(UtilitiesError::ModuleLoadFailed {
            library_name: name.to_string(),
            message,
        }),
    }
}

/// Check whether an optional module is installed.
///
/// Only a "not found" resolution reports `false`. A module that is present
/// but fails to load still counts as installed; the failure is logged here
/// and surfaced by [`crate::guard`] when the module is actually required.
pub fn has_package(name: &str) -> bool {
    match probe_module(name) {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!("{}", err);
            true
        }
    }
}
