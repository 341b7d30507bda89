//! Capability probe commands.
//!
//! `has-package` and `has-executable` print `true` or `false` and exit
//! non-zero when the capability is missing, so they compose in shell
//! conditionals.

use std::io::Write;

use crate::capability::{has_executable, has_package};
use crate::error::Result;

use super::dispatcher::{Command, CommandResult};

/// The `has-package` command implementation.
pub struct HasPackageCommand {
    name: String,
}

impl HasPackageCommand {
    /// Create a new has-package command.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Command for HasPackageCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let found = has_package(&self.name);
        writeln!(out, "{}", found)?;
        Ok(CommandResult::from_bool(found))
    }
}

/// The `has-executable` command implementation.
pub struct HasExecutableCommand {
    name: String,
}

impl HasExecutableCommand {
    /// Create a new has-executable command.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Command for HasExecutableCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let found = has_executable(&self.name);
        writeln!(out, "{}", found)?;
        Ok(CommandResult::from_bool(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(command: &dyn Command) -> (CommandResult, String) {
        let mut out = Vec::new();
        let result = command.execute(&mut out).unwrap();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn missing_package_prints_false() {
        let (result, output) = run(&HasPackageCommand::new("nummmmmmpy"));
        assert!(!result.success);
        assert_eq!(output, "false\n");
    }

    #[test]
    fn builtin_package_prints_true() {
        let (result, output) = run(&HasPackageCommand::new("std"));
        assert!(result.success);
        assert_eq!(output, "true\n");
    }

    #[test]
    fn missing_executable_prints_false() {
        let (result, output) = run(&HasExecutableCommand::new("pyyyyython"));
        assert_eq!(result.exit_code, 1);
        assert_eq!(output, "false\n");
    }

    #[cfg(unix)]
    #[test]
    fn absolute_executable_prints_true() {
        let (result, _) = run(&HasExecutableCommand::new("/bin/sh"));
        assert!(result.success);
    }
}
