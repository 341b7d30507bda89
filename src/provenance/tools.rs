//! Package-manager discovery and per-tool listing strategies.
//!
//! Every supported tool maps to a [`ToolStrategy`]: the arguments that list
//! installed packages, whether a structured `--json` mode exists, and how
//! many header lines precede the rows of the plain-text table.

use std::env::VarError;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::capability::find_executable_with_env;
use crate::config::{FormatPreference, OracleConfig};

/// A known package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Pixi,
    Conda,
    Mamba,
    Micromamba,
    /// A conda-compatible tool not known by name.
    Other,
}

impl ToolKind {
    /// Identify a tool from its executable name or path.
    pub fn from_executable(program: &Path) -> Self {
        let stem = program
            .file_stem()
            .map(|s| s.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match stem.as_str() {
            "pixi" => ToolKind::Pixi,
            "conda" => ToolKind::Conda,
            "mamba" => ToolKind::Mamba,
            "micromamba" => ToolKind::Micromamba,
            _ => ToolKind::Other,
        }
    }

    /// The listing strategy for this tool.
    pub fn strategy(&self) -> ToolStrategy {
        let header = match self {
            ToolKind::Pixi => HeaderRule::Fixed(1),
            ToolKind::Conda | ToolKind::Mamba => HeaderRule::Fixed(3),
            ToolKind::Micromamba => HeaderRule::Fixed(4),
            ToolKind::Other => HeaderRule::Dynamic,
        };
        ToolStrategy {
            kind: *self,
            list_args: &["list"],
            json_flag: Some("--json"),
            header,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolKind::Pixi => "pixi",
            ToolKind::Conda => "conda",
            ToolKind::Mamba => "mamba",
            ToolKind::Micromamba => "micromamba",
            ToolKind::Other => "package manager",
        };
        f.write_str(name)
    }
}

/// How many leading lines of a plain-text listing to discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRule {
    /// A fixed number of lines.
    Fixed(usize),
    /// Through the first separator row (dashes or box-drawing rules) if
    /// there is one, otherwise any leading blank or `#` comment lines.
    Dynamic,
}

/// The shape of output to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A JSON array of records with `name` and `version` fields.
    Json,
    /// Whitespace-separated columns after a header.
    Table(HeaderRule),
}

/// How to list installed packages with one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStrategy {
    /// Which tool this strategy drives.
    pub kind: ToolKind,
    /// Subcommand listing installed packages.
    pub list_args: &'static [&'static str],
    /// Flag requesting structured output, if supported.
    pub json_flag: Option<&'static str>,
    /// Header rule for the plain-text table.
    pub header: HeaderRule,
}

impl ToolStrategy {
    /// Pick the output format honouring the configured preference.
    pub fn output_format(&self, preference: FormatPreference) -> OutputFormat {
        match (preference, self.json_flag) {
            (FormatPreference::Table, _) | (_, None) => OutputFormat::Table(self.header),
            (FormatPreference::Auto | FormatPreference::Json, Some(_)) => OutputFormat::Json,
        }
    }
}

/// A located package manager, ready to invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTool {
    /// Executable to run.
    pub program: PathBuf,
    /// Listing strategy selected for it.
    pub strategy: ToolStrategy,
    /// Arguments appended after the listing subcommand.
    pub extra_args: Vec<String>,
    /// Where the tool was found, for logs.
    pub source: ToolSource,
}

/// How a tool was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSource {
    /// An active pixi shell (`PIXI_IN_SHELL`/`PIXI_EXE`).
    PixiShell,
    /// An activated conda environment (`CONDA_EXE`).
    CondaShell,
    /// An activated mamba/micromamba environment (`MAMBA_EXE`).
    MambaShell,
    /// The preference list searched on `PATH`.
    SearchPath,
}

impl DiscoveredTool {
    fn new(program: PathBuf, source: ToolSource) -> Self {
        let strategy = ToolKind::from_executable(&program).strategy();
        Self {
            program,
            strategy,
            extra_args: Vec::new(),
            source,
        }
    }

    /// Arguments and expected output format for one listing call.
    pub fn invocation(&self, preference: FormatPreference) -> (Vec<String>, OutputFormat) {
        let format = self.strategy.output_format(preference);
        let mut args: Vec<String> = self
            .strategy
            .list_args
            .iter()
            .map(|arg| arg.to_string())
            .collect();
        if let (OutputFormat::Json, Some(flag)) = (format, self.strategy.json_flag) {
            args.push(flag.to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        (args, format)
    }
}

/// Find the package manager to query, using the process environment.
pub fn discover_tool(config: &OracleConfig) -> Option<DiscoveredTool> {
    discover_tool_with_env(config, |key| std::env::var(key))
}

/// Find the package manager to query with a custom env var lookup.
///
/// Active shells take precedence over the search path, in this order:
///
/// 1. A pixi shell: `PIXI_IN_SHELL=1` with `PIXI_EXE` set
/// 2. An activated conda environment: `CONDA_SHLVL` non-zero with `CONDA_EXE` set
/// 3. An activated mamba environment: `CONDA_SHLVL` non-zero with `MAMBA_EXE` set
/// 4. The first entry of [`OracleConfig::preference`] found on `PATH`
pub fn discover_tool_with_env<F>(config: &OracleConfig, env_fn: F) -> Option<DiscoveredTool>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    if config.use_environment {
        if let Some(tool) = tool_from_shell(&env_fn) {
            tracing::debug!(
                "Using {} from {:?}: {}",
                tool.strategy.kind,
                tool.source,
                tool.program.display()
            );
            return Some(tool);
        }
    }

    for name in &config.preference {
        if let Some(program) = find_executable_with_env(name, &env_fn) {
            tracing::debug!("Found {} on PATH at {}", name, program.display());
            return Some(DiscoveredTool::new(program, ToolSource::SearchPath));
        }
    }

    None
}

fn tool_from_shell<F>(env_fn: &F) -> Option<DiscoveredTool>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let non_empty = |key: &str| env_fn(key).ok().filter(|value| !value.is_empty());

    if env_fn("PIXI_IN_SHELL").as_deref() == Ok("1") {
        if let Some(pixi) = non_empty("PIXI_EXE") {
            let mut tool = DiscoveredTool::new(PathBuf::from(pixi), ToolSource::PixiShell);
            if let Some(manifest) = non_empty("PIXI_PROJECT_MANIFEST") {
                tool.extra_args = vec!["--manifest-path".to_string(), manifest];
            }
            return Some(tool);
        }
    }

    let shell_active = env_fn("CONDA_SHLVL")
        .map(|level| level != "0")
        .unwrap_or(false);
    if !shell_active {
        return None;
    }

    if let Some(conda) = non_empty("CONDA_EXE") {
        return Some(DiscoveredTool::new(
            PathBuf::from(conda),
            ToolSource::CondaShell,
        ));
    }

    non_empty("MAMBA_EXE")
        .map(|mamba| DiscoveredTool::new(PathBuf::from(mamba), ToolSource::MambaShell))
}
