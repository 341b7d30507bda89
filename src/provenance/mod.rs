//! Installed-package provenance from conda-compatible package managers.
//!
//! The [`VersionOracle`] locates a package manager (pixi, micromamba,
//! mamba or conda), runs its listing command once, and caches the
//! resulting name → version table for the life of the oracle. The
//! process-wide oracle behind [`get_package_version`] is configured from
//! `OPENFF_*` environment variables (see [`crate::config`]).
//!
//! Version lookups are advisory: [`VersionOracle::get_package_version`]
//! never fails for environmental reasons. A missing package manager or an
//! unparsable listing is logged as a warning and reported as `None`.
//!
//! # Modules
//!
//! - [`parse`] - JSON and plain-text listing parsers
//! - [`runner`] - Blocking subprocess execution
//! - [`tools`] - Tool discovery and per-tool listing strategies
//!
//! # Example
//!
//! ```no_run
//! use openff_utilities::provenance::get_ambertools_version;
//!
//! match get_ambertools_version() {
//!     Some(version) => println!("AmberTools {}", version),
//!     None => println!("AmberTools version unknown"),
//! }
//! ```

pub mod parse;
pub mod runner;
pub mod tools;

pub use parse::{parse_json_listing, parse_table_listing, VersionTable};
pub use runner::{display_command, CommandOutput, CommandRunner, SystemRunner};
pub use tools::{
    discover_tool, discover_tool_with_env, DiscoveredTool, HeaderRule, OutputFormat, ToolKind,
    ToolSource, ToolStrategy,
};

use std::env::VarError;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use crate::config::{OracleConfig, Strictness};
use crate::error::{Result, UtilitiesError};

/// Environment lookup used for tool discovery.
type EnvLookup = Box<dyn Fn(&str) -> std::result::Result<String, VarError> + Send + Sync>;

/// Discovers a package manager and caches its package-version table.
pub struct VersionOracle<R: CommandRunner = SystemRunner> {
    config: OracleConfig,
    runner: R,
    env: EnvLookup,
    cache: Mutex<Option<Arc<VersionTable>>>,
}

impl VersionOracle<SystemRunner> {
    /// An oracle that runs the package manager as a subprocess.
    pub fn new(config: OracleConfig) -> Self {
        let runner = SystemRunner::new().with_timeout(config.timeout());
        Self::with_runner(config, runner)
    }
}

impl<R: CommandRunner> VersionOracle<R> {
    /// An oracle using a custom command runner.
    pub fn with_runner(config: OracleConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            env: Box::new(|key| std::env::var(key)),
            cache: Mutex::new(None),
        }
    }

    /// Replace the environment lookup used for tool discovery (for testing).
    pub fn with_env<F>(mut self, env_fn: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<String, VarError> + Send + Sync + 'static,
    {
        self.env = Box::new(env_fn);
        self
    }

    /// The oracle's configuration.
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// The command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The full package-version table, built on first use.
    ///
    /// The cache lock is held while building, so concurrent first calls
    /// run the package manager once. A failed build leaves the cache as it
    /// was and the next call tries again.
    ///
    /// With [`Strictness::Lenient`] a missing package manager yields an
    /// empty table (cached like any other result) and a warning; with
    /// [`Strictness::Strict`] it is [`UtilitiesError::CondaExecutableNotFound`].
    pub fn package_versions(&self) -> Result<Arc<VersionTable>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = cache.as_ref() {
            tracing::debug!("Using cached package versions ({} packages)", table.len());
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.build_table()?);
        *cache = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Look up one package's version.
    ///
    /// Names match exactly, with the case the package manager reports.
    /// Returns `None` when the package is not installed, when no package
    /// manager is available, or when listing packages fails.
    pub fn get_package_version(&self, package_name: &str) -> Option<String> {
        match self.package_versions() {
            Ok(table) => table.get(package_name).cloned(),
            Err(UtilitiesError::CondaExecutableNotFound) => {
                tracing::warn!(
                    kind = "conda_executable_not_found",
                    "No conda/mamba/micromamba executable found. Unable to determine {} version, returning None.",
                    package_name
                );
                None
            }
            Err(err) => {
                tracing::warn!(
                    kind = "conda_list_failed",
                    error = %err,
                    "Something went wrong parsing the output of `conda list` or similar. Unable to determine {} version, returning None.",
                    package_name
                );
                None
            }
        }
    }

    /// Drop the cached table so the next lookup runs the package manager again.
    pub fn reset(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a table has been cached.
    pub fn is_cached(&self) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn build_table(&self) -> Result<VersionTable> {
        let Some(tool) = discover_tool_with_env(&self.config, |key| (self.env)(key)) else {
            return match self.config.strictness {
                Strictness::Strict => Err(UtilitiesError::CondaExecutableNotFound),
                Strictness::Lenient => {
                    tracing::warn!(
                        kind = "conda_executable_not_found",
                        "No conda/mamba/micromamba executable found. Unable to determine package versions."
                    );
                    Ok(VersionTable::new())
                }
            };
        };

        let (args, format) = tool.invocation(self.config.output_format);
        let output = self.runner.run(&tool.program, &args)?;
        if !output.success {
            return Err(UtilitiesError::ToolInvocationFailed {
                command: display_command(&tool.program, &args),
                code: output.exit_code,
                stderr: output.stderr,
            });
        }

        let tool_name = tool.strategy.kind.to_string();
        let table = match format {
            OutputFormat::Json => parse_json_listing(&tool_name, &output.stdout)?,
            OutputFormat::Table(header) => {
                parse_table_listing(&tool_name, &output.stdout, header)?
            }
        };

        tracing::debug!(
            "Read {} package versions from {} in {:.2?}",
            table.len(),
            tool.program.display(),
            output.duration
        );
        Ok(table)
    }
}

impl<R: CommandRunner + fmt::Debug> fmt::Debug for VersionOracle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionOracle")
            .field("config", &self.config)
            .field("runner", &self.runner)
            .field("cached", &self.is_cached())
            .finish()
    }
}

static ORACLE: LazyLock<VersionOracle> = LazyLock::new(|| {
    let config = OracleConfig::from_env().unwrap_or_else(|err| {
        tracing::warn!("Ignoring invalid version oracle settings: {}", err);
        OracleConfig::default()
    });
    VersionOracle::new(config)
});

/// The process-wide version oracle.
pub fn global_oracle() -> &'static VersionOracle {
    &ORACLE
}

/// Look up an installed package's version with the process-wide oracle.
pub fn get_package_version(package_name: &str) -> Option<String> {
    ORACLE.get_package_version(package_name)
}

/// The installed AmberTools version, if it can be determined.
pub fn get_ambertools_version() -> Option<String> {
    get_package_version("ambertools")
}

/// The full package-version table from the process-wide oracle.
pub fn package_versions() -> Result<Arc<VersionTable>> {
    ORACLE.package_versions()
}

/// Clear the process-wide cache so the next lookup rebuilds it.
pub fn reset_package_version_cache() {
    ORACLE.reset();
}
