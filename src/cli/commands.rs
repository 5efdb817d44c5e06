//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// bbdeploy - Look up Bitbucket deployment environments.
#[derive(Parser, Debug)]
#[command(name = "bbdeploy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "BBDEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Repository selection shared by the lookup commands.
#[derive(Args, Debug, Clone)]
pub struct RepositoryArgs {
    /// Workspace slug or UUID.
    #[arg(short, long, env = "BITBUCKET_WORKSPACE")]
    pub workspace: String,

    /// Repository slug or UUID.
    #[arg(short, long)]
    pub repository: String,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a deployment environment by UUID or name.
    Get {
        /// Environment UUID or display name.
        identifier: String,

        /// Repository to search.
        #[command(flatten)]
        repo: RepositoryArgs,

        /// Fail instead of fetching when nothing matches the identifier.
        #[arg(long)]
        fail_on_unmatched: bool,
    },

    /// List the deployment environments of a repository.
    List {
        /// Repository to list.
        #[command(flatten)]
        repo: RepositoryArgs,
    },

    /// Show the deployment data-source schema.
    Schema,

    /// Validate the configuration.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
