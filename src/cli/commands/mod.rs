//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands write
//! to a caller-supplied sink so they can be exercised without a terminal.

pub mod dispatcher;
pub mod probe;
pub mod version;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use probe::{HasExecutableCommand, HasPackageCommand};
pub use version::{ListCommand, VersionCommand, UNKNOWN_VERSION};
