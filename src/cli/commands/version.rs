//! Package version commands.

use std::io::Write;

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::provenance::{CommandRunner, VersionOracle};

use super::dispatcher::{Command, CommandResult};

/// Printed when the version of a package cannot be determined.
pub const UNKNOWN_VERSION: &str = "unknown";

/// The `version` command implementation.
pub struct VersionCommand<'a, R: CommandRunner> {
    oracle: &'a VersionOracle<R>,
    package: String,
}

impl<'a, R: CommandRunner> VersionCommand<'a, R> {
    /// Create a new version command.
    pub fn new(oracle: &'a VersionOracle<R>, package: &str) -> Self {
        Self {
            oracle,
            package: package.to_string(),
        }
    }
}

impl<R: CommandRunner> Command for VersionCommand<'_, R> {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let version = self.oracle.get_package_version(&self.package);
        writeln!(out, "{}", version.as_deref().unwrap_or(UNKNOWN_VERSION))?;
        Ok(CommandResult::success())
    }
}

/// The `list` command implementation.
///
/// Unlike `version`, a failed listing is reported as an error.
pub struct ListCommand<'a, R: CommandRunner> {
    oracle: &'a VersionOracle<R>,
    args: ListArgs,
}

impl<'a, R: CommandRunner> ListCommand<'a, R> {
    /// Create a new list command.
    pub fn new(oracle: &'a VersionOracle<R>, args: ListArgs) -> Self {
        Self { oracle, args }
    }
}

impl<R: CommandRunner> Command for ListCommand<'_, R> {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let table = self.oracle.package_versions()?;

        if self.args.json {
            let json = serde_json::to_string_pretty(table.as_ref())
                .map_err(|e| anyhow::anyhow!("Failed to serialize package list: {}", e))?;
            writeln!(out, "{}", json)?;
            return Ok(CommandResult::success());
        }

        let width = table.keys().map(String::len).max().unwrap_or(0);
        for (name, version) in table.iter() {
            writeln!(out, "{:<width$}  {}", name, version, width = width)?;
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OracleConfig;
    use crate::error::UtilitiesError;
    use crate::provenance::CommandOutput;
    use std::env::VarError;
    use std::path::Path;

    struct StaticRunner(CommandOutput);

    impl CommandRunner for StaticRunner {
        fn run(&self, _program: &Path, _args: &[String]) -> Result<CommandOutput> {
            Ok(self.0.clone())
        }
    }

    fn oracle(output: CommandOutput) -> VersionOracle<StaticRunner> {
        VersionOracle::with_runner(OracleConfig::default(), StaticRunner(output)).with_env(
            |key: &str| match key {
                "CONDA_SHLVL" => Ok("1".to_string()),
                "CONDA_EXE" => Ok("/opt/conda/bin/conda".to_string()),
                _ => Err(VarError::NotPresent),
            },
        )
    }

    fn listing() -> CommandOutput {
        CommandOutput::success(
            r#"[
                {"name": "ambertools", "version": "23.3"},
                {"name": "rdkit", "version": "2024.03.5"}
            ]"#,
        )
    }

    #[test]
    fn version_prints_known_package() {
        let oracle = oracle(listing());
        let mut out = Vec::new();
        let result = VersionCommand::new(&oracle, "rdkit").execute(&mut out).unwrap();

        assert!(result.success);
        assert_eq!(String::from_utf8(out).unwrap(), "2024.03.5\n");
    }

    #[test]
    fn version_prints_unknown_for_missing_package() {
        let oracle = oracle(listing());
        let mut out = Vec::new();
        let result = VersionCommand::new(&oracle, "openmm").execute(&mut out).unwrap();

        assert!(result.success);
        assert_eq!(String::from_utf8(out).unwrap(), "unknown\n");
    }

    #[test]
    fn list_prints_aligned_rows() {
        let oracle = oracle(listing());
        let mut out = Vec::new();
        ListCommand::new(&oracle, ListArgs::default())
            .execute(&mut out)
            .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(output, "ambertools  23.3\nrdkit       2024.03.5\n");
    }

    #[test]
    fn list_json_is_an_object() {
        let oracle = oracle(listing());
        let mut out = Vec::new();
        ListCommand::new(&oracle, ListArgs { json: true })
            .execute(&mut out)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["ambertools"], "23.3");
    }

    #[test]
    fn list_surfaces_tool_failure() {
        let oracle = oracle(CommandOutput::failure(Some(2), "boom"));
        let mut out = Vec::new();
        let err = ListCommand::new(&oracle, ListArgs::default())
            .execute(&mut out)
            .unwrap_err();

        assert!(matches!(err, UtilitiesError::ToolInvocationFailed { .. }));
    }
}
