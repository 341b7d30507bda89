//! Command-line interface for the `openff-utilities` diagnostic binary.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ListArgs, NameArgs, VersionArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
