//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;

use crate::cli::args::{Cli, Commands};
use crate::config::OracleConfig;
use crate::error::Result;
use crate::provenance::VersionOracle;

use super::probe::{HasExecutableCommand, HasPackageCommand};
use super::version::{ListCommand, VersionCommand};

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, writing results to `out`.
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Success or failure from a yes/no answer.
    pub fn from_bool(answer: bool) -> Self {
        if answer {
            Self::success()
        } else {
            Self::failure(1)
        }
    }
}

/// Dispatches CLI commands to their implementations.
#[derive(Debug, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Create a new dispatcher.
    pub fn new() -> Self {
        Self
    }

    /// Build the oracle settings: config file (if any), then `OPENFF_*` overrides.
    pub fn oracle_config(cli: &Cli) -> Result<OracleConfig> {
        let mut config = match &cli.config {
            Some(path) => OracleConfig::load(path)?,
            None => OracleConfig::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, out: &mut dyn Write) -> Result<CommandResult> {
        match &cli.command {
            Commands::HasPackage(args) => HasPackageCommand::new(&args.name).execute(out),
            Commands::HasExecutable(args) => HasExecutableCommand::new(&args.name).execute(out),
            Commands::Version(args) => {
                let oracle = VersionOracle::new(Self::oracle_config(cli)?);
                VersionCommand::new(&oracle, &args.package).execute(out)
            }
            Commands::List(args) => {
                let oracle = VersionOracle::new(Self::oracle_config(cli)?);
                ListCommand::new(&oracle, args.clone()).execute(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_from_bool() {
        assert_eq!(CommandResult::from_bool(true).exit_code, 0);
        let failed = CommandResult::from_bool(false);
        assert!(!failed.success);
        assert_eq!(failed.exit_code, 1);
    }

    #[test]
    fn dispatches_has_package() {
        let cli = Cli::parse_from(["openff-utilities", "has-package", "openff.utilities"]);
        let mut out = Vec::new();
        let result = CommandDispatcher::new().dispatch(&cli, &mut out).unwrap();

        assert!(result.success);
        assert_eq!(String::from_utf8(out).unwrap().trim(), "true");
    }

    #[test]
    fn oracle_config_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("oracle.yml");
        fs::write(&path, "preference: [conda]\n").unwrap();

        let cli = Cli::parse_from([
            "openff-utilities",
            "--config",
            path.to_str().unwrap(),
            "list",
        ]);
        let config = CommandDispatcher::oracle_config(&cli).unwrap();
        assert_eq!(config.preference, vec!["conda"]);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from([
            "openff-utilities",
            "--config",
            "/nonexistent/oracle.yml",
            "version",
            "ambertools",
        ]);
        let mut out = Vec::new();
        assert!(CommandDispatcher::new().dispatch(&cli, &mut out).is_err());
    }
}
