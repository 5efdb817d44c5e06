//! CLI module for the bbdeploy tool.
//!
//! This module provides the command-line interface for looking up
//! Bitbucket deployment environments.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, RepositoryArgs};
pub use output::OutputFormatter;
