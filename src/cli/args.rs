//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// openff-utilities - Optional-dependency and package-version diagnostics.
#[derive(Debug, Parser)]
#[command(name = "openff-utilities")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a version oracle config file (YAML)
    #[arg(short, long, global = true, env = "OPENFF_UTILITIES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check whether an optional module is available
    HasPackage(NameArgs),

    /// Check whether an executable is available by path or on PATH
    HasExecutable(NameArgs),

    /// Show the installed version of a package
    Version(VersionArgs),

    /// List installed packages and their versions
    List(ListArgs),
}

/// Arguments naming a module or executable.
#[derive(Debug, Clone, clap::Args)]
pub struct NameArgs {
    /// Module or executable name
    pub name: String,
}

/// Arguments for the `version` command.
#[derive(Debug, Clone, clap::Args)]
pub struct VersionArgs {
    /// Package name, exactly as the package manager reports it
    pub package: String,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_command() {
        let cli = Cli::parse_from(["openff-utilities", "version", "ambertools"]);
        match cli.command {
            Commands::Version(args) => assert_eq!(args.package, "ambertools"),
            other => panic!("Expected Version, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "openff-utilities",
            "list",
            "--json",
            "--debug",
            "--config",
            "oracle.yml",
        ]);
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("oracle.yml")));
        assert!(matches!(cli.command, Commands::List(ListArgs { json: true })));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["openff-utilities"]).is_err());
    }

    #[test]
    fn kebab_case_subcommands() {
        let cli = Cli::parse_from(["openff-utilities", "has-executable", "conda"]);
        assert!(matches!(
            cli.command,
            Commands::HasExecutable(NameArgs { ref name }) if name == "conda"
        ));
    }
}
