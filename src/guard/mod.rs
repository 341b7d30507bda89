//! Dependency guards for operations that need optional modules.
//!
//! A [`Requirement`] names a module (and, for licensed toolkits, a license
//! predicate exported by that module). Wrapping an operation with
//! [`Requirement::wrap`] yields a [`Guarded`] operation that re-checks the
//! requirement on every call and never runs the operation when the check
//! fails.
//!
//! # Example
//!
//! ```
//! use openff_utilities::guard::requires_package;
//!
//! let double = requires_package("std").wrap(|x: u32| x * 2);
//! assert_eq!(double.call_with(21).unwrap(), 42);
//!
//! let err = requires_package("fake-lib").call(|| ()).unwrap_err();
//! assert_eq!(err.library_name(), Some("fake-lib"));
//! ```

mod openeye;

pub use openeye::OeModule;

use crate::capability::{import_module, ModuleError};
use crate::error::{Result, UtilitiesError};

/// A module an operation depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    license_predicate: Option<String>,
}

impl Requirement {
    /// Require a module to be installed.
    pub fn package(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            license_predicate: None,
        }
    }

    /// Require a module to be installed and its named license predicate to pass.
    pub fn licensed(name: impl Into<String>, license_predicate: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            license_predicate: Some(license_predicate.into()),
        }
    }

    /// The required module's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The license predicate consulted after import, if any.
    pub fn license_predicate(&self) -> Option<&str> {
        self.license_predicate.as_deref()
    }

    /// Check the requirement against the process-wide module registry.
    ///
    /// Fails with [`UtilitiesError::MissingOptionalDependency`] when the
    /// module is absent or unlicensed. Other load failures are reported as
    /// [`UtilitiesError::ModuleLoadFailed`] and never disguised as missing.
    pub fn check(&self) -> Result<()> {
        let module = match import_module(&self.name) {
            Ok(module) => module,
            Err(ModuleError::NotFound) => {
                tracing::debug!("Required module {} is not installed", self.name);
                return Err(UtilitiesError::missing_dependency(&self.name, false));
            }
            Err(ModuleError::Failed(message)) => {
                return Err(UtilitiesError::ModuleLoadFailed {
                    library_name: self.name.clone(),
                    message,
                });
            }
        };

        let Some(predicate) = &self.license_predicate else {
            return Ok(());
        };

        let check =
            module
                .license_check(predicate)
                .ok_or_else(|| UtilitiesError::UnknownLicensePredicate {
                    library_name: self.name.clone(),
                    predicate: predicate.clone(),
                })?;

        if check() {
            Ok(())
        } else {
            tracing::debug!("Required module {} is installed but unlicensed", self.name);
            Err(UtilitiesError::missing_dependency(&self.name, true))
        }
    }

    /// Check the requirement, then run `op`.
    pub fn call<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce() -> T,
    {
        self.check()?;
        Ok(op())
    }

    /// Wrap `op` so every call first checks this requirement.
    pub fn wrap<F>(self, op: F) -> Guarded<F> {
        Guarded {
            requirement: self,
            op,
        }
    }
}

/// Require a module to be installed.
pub fn requires_package(name: impl Into<String>) -> Requirement {
    Requirement::package(name)
}

/// Require an OpenEye toolkit module to be installed and licensed.
pub fn requires_oe_module(module: OeModule) -> Requirement {
    Requirement::licensed(module.module_path(), module.license_predicate())
}

/// An operation guarded by a [`Requirement`].
///
/// Guard decisions are not cached: each call re-probes the registry.
#[derive(Debug, Clone)]
pub struct Guarded<F> {
    requirement: Requirement,
    op: F,
}

impl<F> Guarded<F> {
    /// The requirement checked before each call.
    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Run a no-argument operation.
    pub fn call<T>(&self) -> Result<T>
    where
        F: Fn() -> T,
    {
        self.requirement.check()?;
        Ok((self.op)())
    }

    /// Run a single-argument operation. Use a tuple for several arguments.
    pub fn call_with<A, T>(&self, arg: A) -> Result<T>
    where
        F: Fn(A) -> T,
    {
        self.requirement.check()?;
        Ok((self.op)(arg))
    }

    /// Run a fallible operation, keeping its own error type.
    ///
    /// Guard failures are converted into `E`, so the wrapped operation keeps
    /// the signature of the original.
    pub fn try_call<T, E>(&self) -> std::result::Result<T, E>
    where
        F: Fn() -> std::result::Result<T, E>,
        E: From<UtilitiesError>,
    {
        self.requirement.check()?;
        (self.op)()
    }

    /// Unwrap the guarded operation.
    pub fn into_inner(self) -> F {
        self.op
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{register_module, OptionalModule};
    use std::cell::Cell;

    fn dummy_function() -> &'static str {
        "ran"
    }

    #[test]
    fn present_module_passes_through_result() {
        let guarded = requires_package("std").wrap(dummy_function);
        assert_eq!(guarded.call().unwrap(), dummy_function());
    }

    #[test]
    fn missing_module_never_runs_operation() {
        let calls = Cell::new(0);
        let guarded = requires_package("fake-lib").wrap(|| calls.set(calls.get() + 1));

        let err = guarded.call().unwrap_err();
        assert_eq!(err.library_name(), Some("fake-lib"));
        assert!(!err.license_issue());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn guard_rechecks_on_every_call() {
        let guarded = requires_package("guard_test.late").wrap(|| 1);
        assert!(guarded.call().is_err());

        register_module(OptionalModule::new("guard_test.late"));
        assert_eq!(guarded.call().unwrap(), 1);
    }

    #[test]
    fn call_with_forwards_argument() {
        let guarded = requires_package("core").wrap(|(a, b): (i32, i32)| a + b);
        assert_eq!(guarded.call_with((2, 3)).unwrap(), 5);
    }

    #[test]
    fn try_call_preserves_operation_errors() {
        #[derive(Debug)]
        enum AppError {
            Guard(UtilitiesError),
            Failed,
        }
        impl From<UtilitiesError> for AppError {
            fn from(err: UtilitiesError) -> Self {
                AppError::Guard(err)
            }
        }

        let failing = requires_package("std").wrap(|| -> std::result::Result<(), AppError> {
            Err(AppError::Failed)
        });
        assert!(matches!(failing.try_call(), Err(AppError::Failed)));

        let missing = requires_package("fake-lib").wrap(|| -> std::result::Result<(), AppError> {
            Ok(())
        });
        assert!(matches!(missing.try_call(), Err(AppError::Guard(_))));
    }

    #[test]
    fn broken_module_surfaces_load_failure() {
        register_module(
            OptionalModule::new("guard_test.broken")
                .with_loader(|| Err(ModuleError::Failed("ABI mismatch".into()))),
        );
        let err = requires_package("guard_test.broken")
            .call(dummy_function)
            .unwrap_err();
        assert!(matches!(err, UtilitiesError::ModuleLoadFailed { .. }));
    }

    #[test]
    fn unlicensed_module_reports_license_issue() {
        register_module(
            OptionalModule::new("guard_test.licensed").with_license_check("IsLicensed", || false),
        );
        let calls = Cell::new(0);
        let err = Requirement::licensed("guard_test.licensed", "IsLicensed")
            .call(|| calls.set(1))
            .unwrap_err();

        assert!(err.license_issue());
        assert!(err.to_string().contains("missing license"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn licensed_module_runs_operation() {
        register_module(
            OptionalModule::new("guard_test.paid").with_license_check("IsLicensed", || true),
        );
        let result = Requirement::licensed("guard_test.paid", "IsLicensed").call(|| 7);
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn missing_license_predicate_is_an_error() {
        register_module(OptionalModule::new("guard_test.nopredicate"));
        let err = Requirement::licensed("guard_test.nopredicate", "IsLicensed")
            .check()
            .unwrap_err();
        assert!(matches!(err, UtilitiesError::UnknownLicensePredicate { .. }));
    }

    #[test]
    fn missing_module_message_has_install_hint() {
        let err = requires_package("fake.lib").check().unwrap_err();
        assert!(err
            .to_string()
            .contains("conda install -c conda-forge fake-lib"));
    }

    #[test]
    fn requirement_accessors() {
        let requirement = requires_oe_module(OeModule::OEChem);
        assert_eq!(requirement.name(), "openeye.oechem");
        assert_eq!(requirement.license_predicate(), Some("OEChemIsLicensed"));

        let guarded = requirement.clone().wrap(dummy_function);
        assert_eq!(guarded.requirement(), &requirement);
        assert_eq!((guarded.into_inner())(), "ran");
    }
}
